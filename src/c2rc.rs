//! Converts a POSIX `c2rc.sh` credentials file into a Windows `c2rc.bat`.
//!
//! Comment lines are dropped, `export` becomes `SET`, `${VAR}` becomes
//! `%VAR%`, a quoted `"$VAR"` becomes `%VAR%`, and remaining quotes are
//! removed. Line endings are kept as they are.

use std::io::{self, BufRead, Write};

pub fn convert<R, W>(mut input: R, output: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        output.write_all(convert_line(&line).as_bytes())?;
    }
    output.flush()
}

fn convert_line(line: &str) -> String {
    let mut s = line
        .replace("export", "SET")
        .replace("${", "%")
        .replace('}', "%");

    if s.contains("\"$") {
        s = s.replace('"', "%\"").replace("%\"$", "\"%");
    }

    s.replace('"', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let mut out = Vec::new();
        convert(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_convert_exports() {
        let input = "# CROC Cloud credentials\n\
                     export EC2_URL=https://api.cloud.croc.ru\n\
                     export AWS_ACCESS_KEY_ID=\"project:user@example\"\n";
        assert_eq!(
            run(input),
            "SET EC2_URL=https://api.cloud.croc.ru\nSET AWS_ACCESS_KEY_ID=project:user@example\n"
        );
    }

    #[test]
    fn test_convert_variable_references() {
        assert_eq!(convert_line("export A=${EC2_URL}/x\n"), "SET A=%EC2_URL%/x\n");
        assert_eq!(convert_line("export B=\"$AWS_ACCESS_KEY_ID\"\n"), "SET B=%AWS_ACCESS_KEY_ID%\n");
    }

    #[test]
    fn test_last_line_without_newline() {
        assert_eq!(run("export X=1"), "SET X=1");
    }
}
