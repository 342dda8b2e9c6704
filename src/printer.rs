// ABOUTME: Renders Values back to their textual form, in readable or display mode

use crate::value::{MapKey, Value};

/// Renders `v`. In readable mode strings/escapes round-trip through the
/// reader; in display mode strings are shown raw. Readable mode is what
/// `pr-str`/`prn` use; display mode is what `str`/`println` use.
pub fn pr_str(v: &Value, readable: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, v, readable);
    out
}

fn write_value(out: &mut String, v: &Value, readable: bool) {
    match v {
        Value::Nil => out.push_str("nil"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Symbol(s) => out.push_str(s),
        Value::Keyword(k) => {
            out.push(':');
            out.push_str(k);
        }
        Value::String(s) => write_string(out, s, readable),
        Value::List(items) => write_seq(out, items, '(', ')', readable),
        Value::Vector(items) => write_seq(out, items, '[', ']', readable),
        Value::Map(map) => {
            out.push('{');
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| map_key_sort(a).cmp(&map_key_sort(b)));
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, &(*key).clone().into_value(), readable);
                out.push(' ');
                write_value(out, value, readable);
            }
            out.push('}');
        }
        Value::Function(_) => out.push_str("#<function>"),
        Value::NativeFunction(_) => out.push_str("#<native>"),
        Value::Atom(a) => {
            out.push_str("(atom ");
            write_value(out, &a.borrow(), readable);
            out.push(')');
        }
        Value::Error(data) => write_value(out, &data.value, readable),
    }
}

fn map_key_sort(k: &MapKey) -> String {
    match k {
        MapKey::Str(s) => format!("0{s}"),
        MapKey::Keyword(k) => format!("1{k}"),
    }
}

fn write_seq(out: &mut String, items: &[Value], open: char, close: char, readable: bool) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_value(out, item, readable);
    }
    out.push(close);
}

fn write_string(out: &mut String, s: &str, readable: bool) {
    if !readable {
        out.push_str(s);
        return;
    }
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
}
