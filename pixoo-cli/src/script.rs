/*!
Paint scripts: a line-oriented stand-in for pointer events.

A `#` starting a line, or starting a word after a command's arguments,
begins a comment.

```text
# comments and blank lines are ignored
color #ff0000
down 0 0        # press
move 0 1        # drag
up              # release
eraser          # toggle eraser
clear
load 1700000000000
```
*/

use anyhow::{anyhow, bail, Context, Result};
use pixoo_core::{Color, Editor, KeyValueStore};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Color(Color),
    Eraser,
    Down(usize, usize),
    Move(usize, usize),
    Up,
    Clear,
    Load(String),
}

fn parse_cell<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<(usize, usize)> {
    let row = args.next().ok_or_else(|| anyhow!("missing row"))?;
    let col = args.next().ok_or_else(|| anyhow!("missing column"))?;
    Ok((
        row.parse().with_context(|| format!("invalid row {row:?}"))?,
        col.parse().with_context(|| format!("invalid column {col:?}"))?,
    ))
}

fn parse_line(line: &str) -> Result<Option<Step>> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None => return Ok(None),
        Some(word) if word.starts_with('#') => return Ok(None),
        Some(word) => word,
    };

    let step = match command {
        "color" => {
            let hex = words.next().ok_or_else(|| anyhow!("missing color"))?;
            Step::Color(hex.parse()?)
        }
        "eraser" => Step::Eraser,
        "down" => {
            let (row, col) = parse_cell(&mut words)?;
            Step::Down(row, col)
        }
        "move" => {
            let (row, col) = parse_cell(&mut words)?;
            Step::Move(row, col)
        }
        "up" => Step::Up,
        "clear" => Step::Clear,
        "load" => {
            let id = words.next().ok_or_else(|| anyhow!("missing snapshot id"))?;
            Step::Load(id.to_string())
        }
        other => bail!("unknown command {other:?}"),
    };

    // anything left must be a trailing comment
    if words.next().is_some_and(|word| !word.starts_with('#')) {
        bail!("unexpected trailing arguments");
    }
    Ok(Some(step))
}

/// Parse a whole script, reporting the first bad line
pub fn parse(source: &str) -> Result<Vec<Step>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(n, line)| {
            parse_line(line)
                .with_context(|| format!("line {}: {:?}", n + 1, line.trim()))
                .transpose()
        })
        .collect()
}

/// Feed `steps` to the editor in order
pub fn run<S: KeyValueStore>(editor: &mut Editor<S>, steps: &[Step]) -> Result<()> {
    for step in steps {
        debug!(?step, "Applying paint step");
        match step {
            Step::Color(color) => editor.store_mut().set_color(*color),
            Step::Eraser => editor.store_mut().toggle_eraser(),
            Step::Down(row, col) => editor.store_mut().begin_paint(*row, *col)?,
            Step::Move(row, col) => editor.store_mut().continue_paint(*row, *col)?,
            Step::Up => editor.store_mut().end_paint(),
            Step::Clear => editor.store_mut().clear_all(),
            Step::Load(id) => editor.load(id)?,
        }
    }
    // a script never leaves a gesture open
    editor.store_mut().end_paint();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixoo_core::{MemoryStorage, SnapshotArchive};

    #[test]
    fn test_parse_script() {
        let steps = parse(
            "# header\n\
             color #FF0000\n\
             \n\
             down 0 0   # press\n\
             move 0 1\n\
             up\n\
             eraser\n\
             clear\n\
             load 42\n",
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Color(Color::rgb(0xff, 0, 0)),
                Step::Down(0, 0),
                Step::Move(0, 1),
                Step::Up,
                Step::Eraser,
                Step::Clear,
                Step::Load("42".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = parse("up\ndown 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse("paint 1 1").is_err());
        assert!(parse("color red").is_err());
        assert!(parse("down -1 0").is_err());
        assert!(parse("up now").is_err());
    }

    #[test]
    fn test_run_applies_gestures() {
        let mut editor = Editor::new(SnapshotArchive::open(MemoryStorage::new()));
        let steps = parse(
            "color #0000ff\n\
             down 1 1\n\
             move 1 2\n\
             up\n\
             move 1 3\n\
             eraser\n\
             down 1 1\n",
        )
        .unwrap();

        run(&mut editor, &steps).unwrap();

        let grid = editor.store().grid();
        assert_eq!(grid.get(1, 1), Some(Color::EMPTY));
        assert_eq!(grid.get(1, 2), Some(Color::rgb(0, 0, 0xff)));
        assert_eq!(grid.get(1, 3), Some(Color::EMPTY));
        assert!(!editor.store().paint_state().is_drawing);
    }

    #[test]
    fn test_run_stops_at_out_of_range_cell() {
        let mut editor = Editor::new(SnapshotArchive::open(MemoryStorage::new()));
        let steps = parse("down 64 0\ndown 0 0\n").unwrap();

        assert!(run(&mut editor, &steps).is_err());
        assert_eq!(editor.store().grid().painted_cells(), 0);
    }
}
