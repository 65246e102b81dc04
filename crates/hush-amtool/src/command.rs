//! `amtool` command lines. Every argument that carries user text is quoted
//! for the remote `sh -c`.

use hush_core::SilenceRequest;

/// `amtool silence query -o json`
pub fn query_command(amtool: &str) -> String {
    format!("{amtool} silence query -o json")
}

/// `amtool silence add` for `request`, matchers in rule order.
pub fn create_command(amtool: &str, request: &SilenceRequest) -> String {
    let mut cmd = format!(
        "{amtool} silence add --comment={} --author={} --start={} --end={}",
        shell_quote(&request.comment),
        shell_quote(&request.author),
        request.window.start_rendered(),
        request.window.end_rendered(),
    );
    for matcher in &request.matchers {
        cmd.push(' ');
        cmd.push_str(&shell_quote(matcher));
    }
    cmd
}

/// Single-quote `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use hush_core::Window;

    use super::*;

    #[test]
    fn quoting_survives_embedded_quotes() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(r#"a="b""#), r#"'a="b"'"#);
    }

    #[test]
    fn create_command_renders_all_parts_in_order() {
        let request = SilenceRequest {
            comment: "nightly backup".to_string(),
            author: "ops".to_string(),
            window: Window {
                start_utc: Utc.with_ymd_and_hms(2024, 3, 5, 22, 0, 0).unwrap(),
                end_utc: Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap(),
            },
            matchers: vec![
                r#"alertname="Backup""#.to_string(),
                r#"pod=~"db-.*""#.to_string(),
            ],
        };
        let amtool = "amtool --alertmanager.url=http://localhost:9093";
        assert_eq!(
            create_command(amtool, &request),
            "amtool --alertmanager.url=http://localhost:9093 silence add \
             --comment='nightly backup' --author='ops' \
             --start=2024-03-05T22:00:00+00:00 --end=2024-03-06T00:00:00+00:00 \
             'alertname=\"Backup\"' 'pod=~\"db-.*\"'"
        );
    }

    #[test]
    fn query_command_asks_for_json() {
        assert_eq!(query_command("amtool"), "amtool silence query -o json");
    }
}
