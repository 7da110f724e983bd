//! Purpose: Render parsed values in canonical single-line form.
//! Exports: `render_value`, `canonical_cmp`.
//! Role: Deterministic serializer; mapping keys and set elements come out sorted.
//! Invariants: `canonical_cmp` is a total order, so output is stable for any value.
//! Invariants: Scalar formatting follows repr conventions (quote choice, floats, escapes).

use std::cmp::Ordering;

use super::value::{Value, py_cmp};

pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Total order over values: natural comparison where defined, then type name
/// (`NoneType` sorts first by ASCII), then rendered text as a deterministic
/// tiebreak for same-type incomparables.
pub fn canonical_cmp(a: &Value, b: &Value) -> Ordering {
    if let Some(ordering) = py_cmp(a, b) {
        return ordering;
    }
    a.type_name()
        .cmp(b.type_name())
        .then_with(|| render_value(a).cmp(&render_value(b)))
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(int) => out.push_str(&int.to_string()),
        Value::Float(float) => write_float(*float, out),
        Value::Str(text) => write_str(text, out),
        Value::Bytes(data) => write_bytes(data, out),
        Value::List(items) => {
            out.push('[');
            write_items(items, out);
            out.push(']');
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(items, out);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Set(elems) => {
            if elems.is_empty() {
                // No literal produces this, but repr it faithfully anyway.
                out.push_str("set()");
                return;
            }
            let mut sorted: Vec<&Value> = elems.iter().collect();
            sorted.sort_by(|a, b| canonical_cmp(a, b));
            out.push('{');
            for (idx, elem) in sorted.into_iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(elem, out);
            }
            out.push('}');
        }
        Value::Dict(entries) => {
            let mut sorted: Vec<&(Value, Value)> = entries.iter().collect();
            sorted.sort_by(|a, b| canonical_cmp(&a.0, &b.0));
            out.push('{');
            for (idx, (key, value)) in sorted.into_iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(key, out);
                out.push_str(": ");
                write_value(value, out);
            }
            out.push('}');
        }
    }
}

fn write_items(items: &[Value], out: &mut String) {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_value(item, out);
    }
}

// repr-style float formatting: shortest round-trip digits, ".0" for integral
// values, scientific notation with a signed two-digit exponent outside the
// 1e-4 ..< 1e16 magnitude window.
fn write_float(value: f64, out: &mut String) {
    if value.is_nan() {
        out.push_str("nan");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value < 0.0 { "-inf" } else { "inf" });
        return;
    }

    let exp_form = format!("{value:e}");
    let Some((mantissa, exp_str)) = exp_form.split_once('e') else {
        out.push_str(&exp_form);
        return;
    };
    let Ok(exp) = exp_str.parse::<i64>() else {
        out.push_str(&exp_form);
        return;
    };
    if mantissa.starts_with('-') {
        out.push('-');
    }
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        if point >= digits.len() as i64 {
            out.push_str(&digits);
            for _ in 0..(point - digits.len() as i64) {
                out.push('0');
            }
            out.push_str(".0");
        } else if point > 0 {
            out.push_str(&digits[..point as usize]);
            out.push('.');
            out.push_str(&digits[point as usize..]);
        } else {
            out.push_str("0.");
            for _ in 0..-point {
                out.push('0');
            }
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        let magnitude = exp.unsigned_abs();
        if magnitude < 10 {
            out.push('0');
        }
        out.push_str(&magnitude.to_string());
    }
}

fn write_str(text: &str, out: &mut String) {
    let has_single = text.contains('\'');
    let has_double = text.contains('"');
    let quote = if has_single && !has_double { '"' } else { '\'' };

    out.push(quote);
    for ch in text.chars() {
        if ch == quote || ch == '\\' {
            out.push('\\');
            out.push(ch);
        } else if ch == '\n' {
            out.push_str("\\n");
        } else if ch == '\r' {
            out.push_str("\\r");
        } else if ch == '\t' {
            out.push_str("\\t");
        } else if is_printable(ch) {
            out.push(ch);
        } else {
            let code = ch as u32;
            if code <= 0xff {
                out.push_str(&format!("\\x{code:02x}"));
            } else if code <= 0xffff {
                out.push_str(&format!("\\u{code:04x}"));
            } else {
                out.push_str(&format!("\\U{code:08x}"));
            }
        }
    }
    out.push(quote);
}

fn write_bytes(data: &[u8], out: &mut String) {
    let has_single = data.contains(&b'\'');
    let has_double = data.contains(&b'"');
    let quote = if has_single && !has_double { b'"' } else { b'\'' };

    out.push('b');
    out.push(quote as char);
    for &byte in data {
        if byte == quote || byte == b'\\' {
            out.push('\\');
            out.push(byte as char);
        } else if byte == b'\n' {
            out.push_str("\\n");
        } else if byte == b'\r' {
            out.push_str("\\r");
        } else if byte == b'\t' {
            out.push_str("\\t");
        } else if (0x20..=0x7e).contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("\\x{byte:02x}"));
        }
    }
    out.push(quote as char);
}

// Printability approximation for repr escaping: control, C1, and the common
// format/separator/private-use ranges are escaped; everything else prints.
fn is_printable(ch: char) -> bool {
    !matches!(ch,
        '\u{0}'..='\u{1f}'
            | '\u{7f}'..='\u{a0}'
            | '\u{ad}'
            | '\u{200b}'..='\u{200f}'
            | '\u{2028}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{e000}'..='\u{f8ff}'
            | '\u{feff}'
    )
}
