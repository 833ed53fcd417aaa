//! Line commands accepted by `draw` on stdin.
//!
//! Each line is one toolbar action. Parsing is pure so the grammar can be
//! tested without a terminal or a relay.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use std::path::PathBuf;

use canvas::input::Tool;
use canvas::{ObjectId, ObjectKind, Point};
use serde_json::{Value, json};

pub const HELP: &str = "\
commands:
  rect [left top width height]     add a rectangle
  ellipse [left top width height]  add an ellipse
  text <content>                   add a text object
  stroke x,y [x,y ...]             commit a freehand stroke
  color <css color>                set pen color
  width <n>                        set pen width
  pen | eraser                     select tool
  select                           toggle selection mode
  undo | redo | clear
  delete <id>                      remove one object
  list                             print objects in paint order
  export <path>                    write objects as JSONL
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Shape { kind: ObjectKind, initial: Value },
    Stroke(Vec<Point>),
    Color(String),
    Width(f64),
    Tool(Tool),
    ToggleSelect,
    Undo,
    Redo,
    Clear,
    Delete(ObjectId),
    List,
    Export(PathBuf),
    Help,
    Quit,
}

/// Parse one stdin line. `Ok(None)` for blank lines and `#` comments.
///
/// # Errors
///
/// Returns a human-readable message for unknown commands or bad arguments.
pub fn parse(line: &str) -> Result<Option<DrawCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "rect" | "rectangle" => shape(ObjectKind::Rectangle, rest)?,
        "ellipse" | "circle" => shape(ObjectKind::Ellipse, rest)?,
        "text" => {
            let initial = if rest.is_empty() { Value::Null } else { json!({ "content": rest }) };
            DrawCommand::Shape { kind: ObjectKind::Text, initial }
        }
        "stroke" => DrawCommand::Stroke(points(rest)?),
        "color" => {
            if rest.is_empty() {
                return Err("color needs a value".to_owned());
            }
            DrawCommand::Color(rest.to_owned())
        }
        "width" => DrawCommand::Width(number(rest, "width")?),
        "pen" | "eraser" => DrawCommand::Tool(word.parse::<Tool>()?),
        "select" => DrawCommand::ToggleSelect,
        "undo" => DrawCommand::Undo,
        "redo" => DrawCommand::Redo,
        "clear" => DrawCommand::Clear,
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("delete needs an object id".to_owned());
            }
            DrawCommand::Delete(ObjectId::from(rest))
        }
        "list" | "ls" => DrawCommand::List,
        "export" => {
            if rest.is_empty() {
                return Err("export needs a path".to_owned());
            }
            DrawCommand::Export(PathBuf::from(rest))
        }
        "help" | "?" => DrawCommand::Help,
        "quit" | "exit" => DrawCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

fn shape(kind: ObjectKind, rest: &str) -> Result<DrawCommand, String> {
    if rest.is_empty() {
        return Ok(DrawCommand::Shape { kind, initial: Value::Null });
    }
    let nums = rest
        .split_whitespace()
        .map(|n| number(n, kind.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    let [left, top, width, height] = nums[..] else {
        return Err(format!("{} takes 0 or 4 numbers", kind.as_str()));
    };
    Ok(DrawCommand::Shape { kind, initial: json!({ "left": left, "top": top, "width": width, "height": height }) })
}

fn points(rest: &str) -> Result<Vec<Point>, String> {
    let points = rest
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',').ok_or_else(|| format!("bad point {pair:?}, expected x,y"))?;
            Ok(Point::new(number(x, "x")?, number(y, "y")?))
        })
        .collect::<Result<Vec<_>, String>>()?;
    if points.is_empty() {
        return Err("stroke needs at least one x,y point".to_owned());
    }
    Ok(points)
}

fn number(raw: &str, what: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(format!("{what}: {raw:?} is not a number")),
    }
}
