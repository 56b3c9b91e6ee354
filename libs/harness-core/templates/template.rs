$CustomCode$

fn main() {
$TestCases$
}

fn escape_field(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn emit_record(line: &str) {
    use std::io::Write as _;
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "\n{line}");
    let _ = out.flush();
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic".to_string()
    }
}

pub fn report_pass(index: usize) {
    emit_record(&format!("@@ {index} OK"));
}

pub fn report_fail(index: usize, actual: &str, expected: &str) {
    emit_record(&format!(
        "@@ {index} ER\t{}\t{}",
        escape_field(actual),
        escape_field(expected)
    ));
}

pub fn report_error(index: usize, message: &str) {
    emit_record(&format!("@@ {index} EX\t{}", escape_field(message)));
}

pub fn report_skip(index: usize, reason: &str) {
    emit_record(&format!("@@ {index} NA\t{}", escape_field(reason)));
}

