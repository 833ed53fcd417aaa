use super::*;

fn cmd(line: &str) -> DrawCommand {
    parse(line).unwrap().unwrap()
}

#[test]
fn blank_and_comment_lines_are_skipped() {
    assert_eq!(parse("   "), Ok(None));
    assert_eq!(parse("# a note"), Ok(None));
}

#[test]
fn shapes_with_and_without_geometry() {
    assert_eq!(cmd("rect"), DrawCommand::Shape { kind: ObjectKind::Rectangle, initial: Value::Null });
    assert_eq!(
        cmd("ellipse 1 2 30 40"),
        DrawCommand::Shape {
            kind: ObjectKind::Ellipse,
            initial: json!({"left": 1.0, "top": 2.0, "width": 30.0, "height": 40.0}),
        }
    );
    assert!(parse("rect 1 2").unwrap_err().contains("0 or 4"));
    assert!(parse("rect 1 2 x 4").is_err());
}

#[test]
fn text_keeps_the_rest_of_the_line() {
    assert_eq!(
        cmd("text  hello there "),
        DrawCommand::Shape { kind: ObjectKind::Text, initial: json!({"content": "hello there"}) }
    );
    assert_eq!(cmd("text"), DrawCommand::Shape { kind: ObjectKind::Text, initial: Value::Null });
}

#[test]
fn stroke_points() {
    assert_eq!(cmd("stroke 0,0 10.5,-2"), DrawCommand::Stroke(vec![Point::new(0.0, 0.0), Point::new(10.5, -2.0)]));
    assert!(parse("stroke").is_err());
    assert!(parse("stroke 1;2").is_err());
    assert!(parse("stroke 1,NaN").is_err());
}

#[test]
fn pen_settings() {
    assert_eq!(cmd("color #ff0000"), DrawCommand::Color("#ff0000".into()));
    assert_eq!(cmd("width 4"), DrawCommand::Width(4.0));
    assert_eq!(cmd("eraser"), DrawCommand::Tool(Tool::Eraser));
    assert_eq!(cmd("pen"), DrawCommand::Tool(Tool::Pen));
    assert!(parse("color").is_err());
    assert!(parse("width wide").is_err());
}

#[test]
fn history_and_misc_commands() {
    assert_eq!(cmd("undo"), DrawCommand::Undo);
    assert_eq!(cmd("redo"), DrawCommand::Redo);
    assert_eq!(cmd("clear"), DrawCommand::Clear);
    assert_eq!(cmd("select"), DrawCommand::ToggleSelect);
    assert_eq!(cmd("delete abc"), DrawCommand::Delete(ObjectId::from("abc")));
    assert_eq!(cmd("list"), DrawCommand::List);
    assert_eq!(cmd("export out/board.jsonl"), DrawCommand::Export(PathBuf::from("out/board.jsonl")));
    assert_eq!(cmd("quit"), DrawCommand::Quit);
    assert!(parse("delete").is_err());
    assert!(parse("export").is_err());
}

#[test]
fn unknown_command_is_reported() {
    assert!(parse("fly away").unwrap_err().starts_with("unknown command: fly"));
}
