use console::style;
use docx_cleaner::cleaner::{CleanError, CleanupEvent, ErrorKind, FileReport, VerifyReport};
use std::path::Path;

const HEADER_WIDTH: usize = 74;

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ Docx Cleaner · Limpieza de Metadata de Documentos ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn render_file_input_hint() {
    let hint_lines = [
        "┌─ Puedes ingresar:",
        "│   • Un nombre con extensión (ej. informe.docx)",
        "│   • Una ruta relativa (ej. ./docs/informe.docx)",
        "│   • Un directorio para limpiar por lote",
        "└─",
    ];

    for line in hint_lines.iter() {
        println!("{}", style(line).cyan().dim());
    }

    println!();
}

pub fn render_usage() {
    let lines = [
        "┌─ Uso",
        "│   docx-cleaner                               menú interactivo",
        "│   docx-cleaner limpiar <entrada> [salida]",
        "│   docx-cleaner reescribir <entrada> <campos.json> [salida]",
        "│   docx-cleaner simular <entrada> <minutos> [salida]",
        "│   docx-cleaner lote <directorio> [--recursivo]",
        "│   docx-cleaner verificar <archivo>",
        "│",
        "│   --perfil <perfil.json> puede preceder a cualquier subcomando.",
        "└─",
    ];

    for line in lines.iter() {
        println!("{}", style(line).cyan());
    }
}

/// Mensaje de rechazo para el usuario. Cada categoría tiene el suyo y ninguno
/// expone detalles internos.
pub fn rejection_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotAZip => "El archivo no es un documento .docx válido (no es un ZIP).",
        ErrorKind::Corrupt => "El documento está dañado y no se puede leer.",
        ErrorKind::MalformedXml => "El contenido XML del documento está mal formado.",
        ErrorKind::MissingRequiredPart => "Al documento le falta una parte obligatoria.",
        ErrorKind::NotFound => "No se encontró una parte esperada dentro del documento.",
        ErrorKind::DuplicateEntry => "El documento contiene entradas repetidas.",
        ErrorKind::ArchiveWrite => "No se pudo generar el documento limpio.",
        ErrorKind::InvalidTimestamp => "Una de las fechas indicadas no es válida.",
        ErrorKind::VerificationFailed => {
            "El documento generado no superó la verificación y fue descartado."
        }
        ErrorKind::Config => "El archivo de configuración o de campos no es válido.",
        ErrorKind::Io => "No se pudo leer o escribir el archivo.",
    }
}

pub fn describe_error(error: &CleanError) -> String {
    rejection_message(error.kind()).to_string()
}

pub fn render_file_report(input: &Path, report: &FileReport) {
    println!("\n{}", style("┌─ Documento Limpio ─").green());
    println!("{}", style(format!("│ Original: {}", input.display())).green());
    println!(
        "{}",
        style(format!("│ Copia limpia: {}", report.output.display()))
            .green()
            .bold()
    );
    println!(
        "{}",
        style(format!(
            "│ Partes conservadas: {} · descartadas: {}",
            report.kept, report.dropped
        ))
        .green()
    );
    if report.removed_elements > 0 {
        println!(
            "{}",
            style(format!(
                "│ Marcas de revisión eliminadas: {}",
                report.removed_elements
            ))
            .green()
        );
    }
    for part in &report.rewritten {
        println!("{}", style(format!("│   ✓ {}", part)).green().dim());
    }
    println!("{}", style(format!("│ SHA-256: {}", report.sha256)).dim());
    println!("{}", style("└─").green());
}

pub fn render_verify_report(path: &Path, report: &VerifyReport) {
    if report.is_clean() {
        println!("\n{}", style("┌─ Verificación ─").green());
        println!("{}", style(format!("│ {}", path.display())).green());
        println!(
            "{}",
            style("│ Sin partes sobrantes ni marcas de revisión.").green()
        );
        println!("{}", style("└─").green());
        return;
    }

    println!("\n{}", style("┌─ Verificación ─").yellow());
    println!("{}", style(format!("│ {}", path.display())).yellow());
    for entry in &report.unexpected_entries {
        println!("{}", style(format!("│   • parte sobrante: {}", entry)).yellow());
    }
    if report.tracked_elements > 0 {
        println!(
            "{}",
            style(format!(
                "│   • {} marca(s) de revisión o comentario en el cuerpo",
                report.tracked_elements
            ))
            .yellow()
        );
    }
    println!("{}", style("└─").yellow());
}

pub fn render_cleanup_event(event: &CleanupEvent) {
    match event {
        CleanupEvent::Started { total } => {
            println!(
                "\n{}",
                style(format!("┌─ Limpieza por lote: {} archivo(s) ─", total)).cyan()
            );
        }
        CleanupEvent::Processing { index, total, path } => {
            println!(
                "{}",
                style(format!("│ [{}/{}] {}", index, total, path.display())).dim()
            );
        }
        CleanupEvent::Success { output, .. } => {
            println!(
                "{}",
                style(format!("│   ✓ {}", output.display())).green()
            );
        }
        CleanupEvent::Failure { path, kind, .. } => {
            println!(
                "{}",
                style(format!("│   ✗ {}: {}", path.display(), rejection_message(*kind))).red()
            );
        }
        CleanupEvent::Finished {
            successes,
            failures,
        } => {
            println!(
                "{}",
                style(format!(
                    "│ Completados: {} · Con errores: {}",
                    successes, failures
                ))
                .cyan()
            );
            println!("{}", style("└─").cyan());
        }
    }
}

pub fn render_error(message: &str) {
    println!("\n{}", style(format!("│ Error: {}", message)).red());
}
