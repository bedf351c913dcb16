use serde_json::{Number, Value};
use std::fmt::{Arguments, Result, Write};

/// Wraps some underlying buffer by providing methods that write to it
/// in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// Only strings and numbers have a textual form, every other kind of
    /// value writes nothing.
    ///
    /// # Errors
    ///
    /// Propagates any error from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::String(string) => self.write_str(string),
            Value::Number(number) => self.write_number(number),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => Ok(()),
        }
    }

    /// Write the number in its shortest form.
    ///
    /// Integers are written exactly.
    fn write_number(&mut self, number: &Number) -> Result {
        if let Some(integer) = number.as_i64() {
            write!(self.buffer, "{integer}")
        } else if let Some(integer) = number.as_u64() {
            write!(self.buffer, "{integer}")
        } else if let Some(float) = number.as_f64() {
            self.write_float(float)
        } else {
            write!(self.buffer, "{number}")
        }
    }

    /// Write the float the way a JavaScript number converts to a string.
    ///
    /// Magnitudes from `1e-6` up to but excluding `1e21` are written in
    /// positional notation with no trailing `.0`, anything else in exponent
    /// notation such as `1e+21` or `1.5e-7`. Negative zero is written as `0`.
    fn write_float(&mut self, float: f64) -> Result {
        if float == 0.0 {
            return self.buffer.write_char('0');
        }
        if (1e-6..1e21).contains(&float.abs()) {
            return write!(self.buffer, "{float}");
        }

        let exponent = format!("{float:e}");
        match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                write!(self.buffer, "{mantissa}e+{power}")
            }
            _ => self.buffer.write_str(&exponent),
        }
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}

#[cfg(test)]
mod tests {
    use super::Pipe;
    use serde_json::{json, Value};

    fn write(value: Value) -> String {
        let mut buffer = String::new();
        Pipe::new(&mut buffer).write_value(&value).unwrap();

        buffer
    }

    #[test]
    fn test_write_string() {
        assert_eq!(write(json!("YW-2025-001")), "YW-2025-001");
        assert_eq!(write(json!("{{ name }}")), "{{ name }}");
    }

    #[test]
    fn test_write_number() {
        assert_eq!(write(json!(10)), "10");
        assert_eq!(write(json!(-3)), "-3");
        assert_eq!(write(json!(u64::MAX)), "18446744073709551615");
        assert_eq!(write(json!(25.99)), "25.99");
        assert_eq!(write(json!(32.0)), "32");
        assert_eq!(write(json!(0.5)), "0.5");
    }

    #[test]
    fn test_write_float_extremes() {
        assert_eq!(write(json!(-0.0)), "0");
        assert_eq!(write(json!(1e21)), "1e+21");
        assert_eq!(write(json!(2.5e22)), "2.5e+22");
        assert_eq!(write(json!(1e20)), "100000000000000000000");
        assert_eq!(write(json!(0.000001)), "0.000001");
        assert_eq!(write(json!(1.5e-7)), "1.5e-7");
    }

    #[test]
    fn test_write_non_primitive() {
        assert_eq!(write(json!(null)), "");
        assert_eq!(write(json!(true)), "");
        assert_eq!(write(json!([1, 2])), "");
        assert_eq!(write(json!({ "total": 1 })), "");
    }
}
