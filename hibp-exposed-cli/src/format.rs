/// Formats `n` with `separator` between each group of three digits.
pub fn group_thousands(n: u64, separator: char) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + (len - 1) / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0, ','), "0");
        assert_eq!(group_thousands(7, ','), "7");
        assert_eq!(group_thousands(999, ','), "999");
        assert_eq!(group_thousands(1000, ','), "1,000");
        assert_eq!(group_thousands(12345, ','), "12,345");
        assert_eq!(group_thousands(123456, ','), "123,456");
        assert_eq!(group_thousands(10434004, ','), "10,434,004");
        assert_eq!(group_thousands(u64::MAX, ','), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_group_thousands_other_separator() {
        assert_eq!(group_thousands(1234567, '.'), "1.234.567");
        assert_eq!(group_thousands(1234567, '_'), "1_234_567");
    }
}
