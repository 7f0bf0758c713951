//! `layers` command: print the layer panel after applying toggles.

use hoodmap::engine::MapEngine;
use hoodmap::panel::Panel;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Parse a `KEY=on|off` argument.
pub fn parse_toggle(arg: &str) -> Result<(String, bool), CliError> {
    let invalid = |reason: &str| CliError::Toggle {
        arg: arg.to_string(),
        reason: reason.to_string(),
    };
    let (key, state) = arg.split_once('=').ok_or_else(|| invalid("expected KEY=on|off"))?;
    let on = match state.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => true,
        "off" | "false" | "0" => false,
        _ => return Err(invalid("state must be 'on' or 'off'")),
    };
    Ok((key.trim().to_string(), on))
}

pub fn run(runner: &CliRunner, toggles: &[String], show_engine: bool) -> Result<(), CliError> {
    runner.log_startup("layers");
    let parsed = toggles
        .iter()
        .map(|arg| parse_toggle(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let mut controller = match runner.start_session() {
        Ok(controller) => controller,
        Err(CliError::Preload(e)) => {
            print_panel(&Panel::failed());
            return Err(CliError::Preload(e));
        }
        Err(e) => return Err(e),
    };
    for (key, on) in parsed {
        controller
            .set_visible_key(&key, on)
            .map_err(|e| CliError::Toggle {
                arg: key.clone(),
                reason: e.to_string(),
            })?;
    }

    print_panel(&controller.panel());
    println!();
    println!("Markers: {}", controller.markers().len());

    if show_engine {
        println!();
        println!("Engine layers (bottom to top):");
        let engine = controller.engine();
        for layer in engine.style_layers() {
            let state = match engine.is_visible(&layer.id) {
                Some(true) => "visible",
                Some(false) => "hidden",
                None => "?",
            };
            println!("  {:<56} {:?} {}", layer.id, layer.kind, state);
        }
    }

    Ok(())
}

/// Print the panel rows, or its message when loading failed.
fn print_panel(panel: &Panel) {
    if let Some(message) = panel.message {
        println!("{}", message);
        return;
    }
    for row in &panel.rows {
        let mark = if row.checked { "[x]" } else { "[ ]" };
        let caret = match (row.group, row.expanded) {
            (true, true) => "v ",
            (true, false) => "> ",
            (false, _) => "  ",
        };
        let clip = match row.clip {
            Some(true) => "  [clip on]",
            Some(false) => "  [clip off]",
            None => "",
        };
        println!(
            "{}{}{} {}  ({}){}",
            "  ".repeat(row.depth),
            caret,
            mark,
            row.label,
            row.key(),
            clip
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert_eq!(
            parse_toggle("nb__dtn__bike=off").unwrap(),
            ("nb__dtn__bike".to_string(), false)
        );
        assert_eq!(
            parse_toggle(" nb__dtn = ON ").unwrap(),
            ("nb__dtn".to_string(), true)
        );
    }

    #[test]
    fn test_parse_toggle_rejects_malformed() {
        assert!(matches!(
            parse_toggle("nb__dtn__bike"),
            Err(CliError::Toggle { .. })
        ));
        assert!(matches!(
            parse_toggle("nb__dtn__bike=maybe"),
            Err(CliError::Toggle { .. })
        ));
    }
}
