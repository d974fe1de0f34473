use std::fmt;

use plate_core::{Point, Selection};
use plate_format::KeyEvent;

#[derive(Debug, Clone)]
pub enum Step {
    Select(Selection),
    Blur,
    Key(KeyEvent),
    Press(String),
    Type(String),
    Undo,
    Redo,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Select(selection) => write!(
                f,
                "select {} {}",
                PointArg(&selection.anchor),
                PointArg(&selection.focus)
            ),
            Step::Blur => f.write_str("blur"),
            Step::Key(event) => write!(f, "key {:?} {:?}", event.key, event.modifiers),
            Step::Press(id) => write!(f, "press {id}"),
            Step::Type(text) => write!(f, "type {text:?}"),
            Step::Undo => f.write_str("undo"),
            Step::Redo => f.write_str("redo"),
        }
    }
}

struct PointArg<'a>(&'a Point);

impl fmt::Display for PointArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.0.path.iter().map(usize::to_string).collect();
        write!(f, "{}:{}", path.join("."), self.0.offset)
    }
}

/// `0.1:4` is offset 4 in the second run of the first block.
fn parse_point(arg: &str) -> Result<Point, String> {
    let (path, offset) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected <path>:<offset>, got {arg:?}"))?;
    let path = path
        .split('.')
        .map(|ix| ix.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("bad path in {arg:?}: {err}"))?;
    let offset = offset
        .parse::<usize>()
        .map_err(|err| format!("bad offset in {arg:?}: {err}"))?;
    Ok(Point::new(path, offset))
}

pub fn parse_step(arg: &str) -> Result<Step, String> {
    let arg = arg.trim();
    let (verb, rest) = arg.split_once(' ').unwrap_or((arg, ""));
    let rest = rest.trim();
    match verb {
        "select" => {
            let mut points = rest.split_whitespace().map(parse_point);
            let anchor = points
                .next()
                .ok_or_else(|| "select needs at least one point".to_string())??;
            let focus = points.next().transpose()?.unwrap_or_else(|| anchor.clone());
            if points.next().is_some() {
                return Err("select takes at most two points".into());
            }
            Ok(Step::Select(Selection::new(anchor, focus)))
        }
        "key" => KeyEvent::from_combo(rest)
            .map(Step::Key)
            .ok_or_else(|| format!("unknown key combo {rest:?}")),
        "press" if !rest.is_empty() => Ok(Step::Press(rest.to_string())),
        "type" if !rest.is_empty() => Ok(Step::Type(rest.to_string())),
        "blur" => Ok(Step::Blur),
        "undo" => Ok(Step::Undo),
        "redo" => Ok(Step::Redo),
        _ => Err(format!("unknown step {arg:?}")),
    }
}
