use crate::ui;
use console::style;
use docx_cleaner::cleaner::{
    CleanProfile, CleanRequest, DocxCleaner, MetadataFields, RetainedSet, TimeSpec, clean_file,
    collect_docx_files, default_output_path, run_batch_with_sender, verify_clean,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

/// Ejecuta un subcomando de la línea de órdenes.
pub fn run_command(args: &[String]) -> Result<(), String> {
    let (cleaner, args) = split_profile(args)?;
    let Some((command, rest)) = args.split_first() else {
        ui::render_usage();
        return Err("Debes indicar un subcomando.".to_string());
    };

    match command.as_str() {
        "limpiar" => {
            let (input, output) = input_and_output(rest, 0)?;
            clean_and_report(&cleaner, &input, &output, &CleanRequest::StripOnly)
        }
        "reescribir" => {
            let fields_path = rest
                .get(1)
                .ok_or_else(|| "Debes indicar el archivo JSON con los campos.".to_string())?;
            let contents = fs::read_to_string(fields_path)
                .map_err(|e| format!("No se pudo leer {}: {}", fields_path, e))?;
            let fields = MetadataFields::from_json(&contents).map_err(|e| ui::describe_error(&e))?;
            let (input, output) = input_and_output(rest, 1)?;
            clean_and_report(&cleaner, &input, &output, &CleanRequest::Rewrite(fields))
        }
        "simular" => {
            let minutes = rest
                .get(1)
                .ok_or_else(|| "Debes indicar los minutos de edición.".to_string())
                .and_then(|raw| parse_minutes(raw))?;
            let fields = cleaner.profile().simulated_fields(minutes);
            let (input, output) = input_and_output(rest, 1)?;
            clean_and_report(&cleaner, &input, &output, &CleanRequest::Rewrite(fields))
        }
        "lote" => {
            let directory = rest
                .first()
                .ok_or_else(|| "Debes indicar el directorio a limpiar.".to_string())?;
            let recursive = rest[1..].iter().any(|flag| flag == "--recursivo");
            run_batch(&cleaner, Path::new(directory), recursive)
        }
        "verificar" => {
            let path = rest
                .first()
                .ok_or_else(|| "Debes indicar el archivo a verificar.".to_string())?;
            verify_file(Path::new(path))
        }
        "ayuda" | "help" | "--help" | "-h" => {
            ui::render_usage();
            Ok(())
        }
        other => {
            ui::render_usage();
            Err(format!("Subcomando desconocido: {}", other))
        }
    }
}

fn split_profile(args: &[String]) -> Result<(DocxCleaner, &[String]), String> {
    match args {
        [flag, path, rest @ ..] if flag == "--perfil" => {
            let profile = CleanProfile::load(Path::new(path)).map_err(|e| ui::describe_error(&e))?;
            Ok((DocxCleaner::new(profile), rest))
        }
        [flag] if flag == "--perfil" => {
            Err("Debes indicar la ruta del perfil después de --perfil.".to_string())
        }
        _ => Ok((DocxCleaner::default(), args)),
    }
}

/// Toma `<entrada>` de la primera posición y una `[salida]` opcional tras
/// `extra` argumentos intermedios.
fn input_and_output(rest: &[String], extra: usize) -> Result<(PathBuf, PathBuf), String> {
    let input = rest
        .first()
        .map(PathBuf::from)
        .ok_or_else(|| "Debes indicar el documento de entrada.".to_string())?;
    let output = rest
        .get(extra + 1)
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input));
    Ok((input, output))
}

fn parse_minutes(raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("'{}' no es un número de minutos válido.", raw.trim()))
}

fn clean_and_report(
    cleaner: &DocxCleaner,
    input: &Path,
    output: &Path,
    request: &CleanRequest,
) -> Result<(), String> {
    println!("\n{}", style("│ Limpiando documento...").dim());
    let report = clean_file(cleaner, input, output, request).map_err(|e| ui::describe_error(&e))?;
    ui::render_file_report(input, &report);
    Ok(())
}

fn run_batch(cleaner: &DocxCleaner, directory: &Path, recursive: bool) -> Result<(), String> {
    let files = collect_docx_files(directory, recursive).map_err(|e| ui::describe_error(&e))?;
    if files.is_empty() {
        println!(
            "\n{}",
            style("│ No se encontraron documentos .docx en el directorio.").yellow()
        );
        return Ok(());
    }

    let (sender, receiver) = mpsc::channel();
    thread::scope(|scope| {
        scope.spawn(|| {
            run_batch_with_sender(cleaner, files, &CleanRequest::StripOnly, sender);
        });
        for event in receiver {
            ui::render_cleanup_event(&event);
        }
    });

    Ok(())
}

fn verify_file(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("No se pudo leer {}: {}", path.display(), e))?;
    let report =
        verify_clean(&bytes, &RetainedSet::REWRITE, None).map_err(|e| ui::describe_error(&e))?;
    ui::render_verify_report(path, &report);
    Ok(())
}

/// Modo interactivo: pide rutas y muestra el menú de acciones.
pub fn run_interactive() -> Result<(), String> {
    let cleaner = DocxCleaner::default();

    ui::render_header();
    ui::render_file_input_hint();
    println!(
        "{}\n",
        style("Escribe 'salir' o 'exit' para terminar.").dim()
    );

    loop {
        let Some(line) = prompt("Documento o directorio ▸ ")? else {
            println!("\n{}", style("Fin de la entrada. ¡Hasta luego!").dim());
            break;
        };

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("salir") {
            println!("{}", style("Hasta luego!").dim());
            break;
        }

        let path = PathBuf::from(&line);
        let result = if path.is_dir() {
            batch_menu(&cleaner, &path)
        } else if path.is_file() {
            file_menu(&cleaner, &path)
        } else {
            Err(format!("No existe la ruta `{}`.", path.display()))
        };

        if let Err(message) = result {
            ui::render_error(&message);
        }
    }

    Ok(())
}

fn file_menu(cleaner: &DocxCleaner, path: &Path) -> Result<(), String> {
    loop {
        println!("\n{}", style("┌─ Opciones de Limpieza ─").cyan());
        println!("{}", style("│").cyan());
        println!("{}", style("│  [1] Eliminar toda la metadata").cyan());
        println!("{}", style("│  [2] Limpiar y reescribir propiedades").cyan());
        println!("{}", style("│  [3] Limpiar con identidad simulada").cyan());
        println!("{}", style("│  [4] Verificar documento").cyan());
        println!("{}", style("│  [5] Volver").cyan());
        println!("{}", style("└─").cyan());

        let Some(choice) = prompt("\n│ Selecciona una opción ▸ ")? else {
            return Ok(());
        };

        let output = default_output_path(path);
        let result = match choice.as_str() {
            "1" => clean_and_report(cleaner, path, &output, &CleanRequest::StripOnly),
            "2" => ask_fields().and_then(|fields| {
                clean_and_report(cleaner, path, &output, &CleanRequest::Rewrite(fields))
            }),
            "3" => ask_required("│ Minutos de edición ▸ ")
                .and_then(|raw| parse_minutes(&raw))
                .and_then(|minutes| {
                    let fields = cleaner.profile().simulated_fields(minutes);
                    clean_and_report(cleaner, path, &output, &CleanRequest::Rewrite(fields))
                }),
            "4" => verify_file(path),
            "5" => break,
            _ => {
                println!(
                    "\n{}",
                    style("│ Opción inválida. Intenta de nuevo.").yellow()
                );
                Ok(())
            }
        };

        if let Err(message) = result {
            ui::render_error(&message);
        }
    }

    Ok(())
}

fn batch_menu(cleaner: &DocxCleaner, directory: &Path) -> Result<(), String> {
    println!("\n{}", style("┌─ Limpieza por Lote ─").cyan());
    println!(
        "{}",
        style(format!("│ Directorio: {}", directory.display())).cyan()
    );
    println!("{}", style("│  [1] Solo este directorio").cyan());
    println!("{}", style("│  [2] Incluir subdirectorios").cyan());
    println!("{}", style("│  [0] Cancelar").cyan());
    println!("{}", style("└─").cyan());

    match prompt("\n│ Selecciona una opción ▸ ")?.as_deref() {
        Some("1") => run_batch(cleaner, directory, false),
        Some("2") => run_batch(cleaner, directory, true),
        Some("0") | None => Ok(()),
        Some(_) => Err("Opción inválida".to_string()),
    }
}

fn ask_fields() -> Result<MetadataFields, String> {
    println!(
        "\n{}",
        style("┌─ Nuevas propiedades del documento ─").cyan()
    );
    println!(
        "{}",
        style("│ Fechas: AAAA-MM-DDTHH:MM:SSZ, 'ahora' o 'inicio-edicion'").dim()
    );
    println!("{}", style("└─").cyan());

    let author = ask_required("│ Autor ▸ ")?;
    let company = ask_required("│ Empresa ▸ ")?;
    let title = prompt("│ Título (vacío para el predeterminado) ▸ ")?.unwrap_or_default();
    let edit_duration_minutes = parse_minutes(&ask_required("│ Minutos de edición ▸ ")?)?;
    let created = ask_time("│ Fecha de creación ▸ ")?;
    let modified = ask_time("│ Fecha de modificación ▸ ")?;
    let last_printed = ask_time("│ Última impresión ▸ ")?;

    let defaults = MetadataFields::default();
    Ok(MetadataFields {
        author,
        company,
        title: if title.is_empty() { defaults.title } else { title },
        created,
        modified,
        last_printed,
        edit_duration_minutes,
    })
}

fn ask_time(label: &str) -> Result<TimeSpec, String> {
    ask_required(label)?
        .parse()
        .map_err(|e| ui::describe_error(&e))
}

fn ask_required(label: &str) -> Result<String, String> {
    match prompt(label)? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err("El valor no puede estar vacío".to_string()),
    }
}

fn prompt(label: &str) -> Result<Option<String>, String> {
    print!("{}", style(label).cyan());
    io::stdout()
        .flush()
        .map_err(|e| format!("Error al escribir en la terminal: {}", e))?;

    let mut buffer = String::new();
    let bytes_read = io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| format!("Error al leer la entrada: {}", e))?;
    if bytes_read == 0 {
        return Ok(None);
    }

    Ok(Some(buffer.trim().to_string()))
}
