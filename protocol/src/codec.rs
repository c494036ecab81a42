use dailymines_core::{ActionKind, CellId, TimedAction};

use crate::*;

/// Separator between encoded actions.
pub const ACTION_SEPARATOR: &str = ";";
const FIELD_SEPARATOR: char = '-';

const fn kind_tag(kind: ActionKind) -> char {
    use ActionKind::*;
    match kind {
        FlagCell => 'f',
        RevealCell => 'r',
    }
}

fn parse_kind(tag: &str) -> Result<ActionKind, CodecError> {
    match tag {
        "f" => Ok(ActionKind::FlagCell),
        "r" => Ok(ActionKind::RevealCell),
        _ => Err(CodecError::UnknownActionKind(tag.to_owned())),
    }
}

/// `r-3,4-250` for a reveal of cell `(3, 4)` 250 ms after the previous action.
pub fn encode_action(action: &TimedAction) -> String {
    format!(
        "{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}",
        kind_tag(action.kind),
        action.cell,
        action.elapsed_ms
    )
}

pub fn decode_action(entry: &str) -> Result<TimedAction, CodecError> {
    let mut fields = entry.splitn(3, FIELD_SEPARATOR);
    let (Some(kind), Some(cell), Some(elapsed)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(CodecError::MalformedAction(entry.to_owned()));
    };

    let kind = parse_kind(kind)?;
    let cell: CellId = cell
        .parse()
        .map_err(|_| CodecError::InvalidCellId(cell.to_owned()))?;
    let elapsed_ms = elapsed
        .parse()
        .map_err(|_| CodecError::InvalidElapsed(elapsed.to_owned()))?;

    Ok(TimedAction::new(kind, cell, elapsed_ms))
}

pub fn encode_actions(actions: &[TimedAction]) -> String {
    actions
        .iter()
        .map(encode_action)
        .collect::<Vec<_>>()
        .join(ACTION_SEPARATOR)
}

/// Decodes a whole log, failing on the first bad entry.
pub fn decode_actions(encoded: &str) -> Result<Vec<TimedAction>, CodecError> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }
    encoded.split(ACTION_SEPARATOR).map(decode_action).collect()
}

/// Renders a completion time as `mm:ss.mmm`.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    format!("{:02}:{:02}.{:03}", minutes, seconds, ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_compact_entries() {
        let actions = [
            TimedAction::new(ActionKind::RevealCell, CellId::new(0, 0), 0),
            TimedAction::new(ActionKind::FlagCell, CellId::new(12, 3), 1_250),
        ];

        assert_eq!(encode_actions(&actions), "r-0,0-0;f-12,3-1250");
        assert_eq!(decode_actions("r-0,0-0;f-12,3-1250").unwrap(), actions);
    }

    #[test]
    fn extreme_cells_and_delays_survive() {
        let actions = [
            TimedAction::new(ActionKind::RevealCell, CellId::new(255, 255), 0),
            TimedAction::new(ActionKind::FlagCell, CellId::new(0, 255), u64::MAX),
            TimedAction::new(ActionKind::RevealCell, CellId::new(255, 0), u64::MAX - 1),
            TimedAction::new(ActionKind::FlagCell, CellId::new(128, 7), 1),
        ];

        let encoded = encode_actions(&actions);

        assert!(encoded.contains(&format!("f-0,255-{}", u64::MAX)));
        assert_eq!(decode_actions(&encoded).unwrap(), actions);
        assert!(matches!(decode_action("r-256,0-0"), Err(CodecError::InvalidCellId(_))));
        assert!(matches!(
            decode_action("r-0,0-18446744073709551616"),
            Err(CodecError::InvalidElapsed(_))
        ));
    }

    #[test]
    fn empty_log_is_empty_string() {
        assert_eq!(encode_actions(&[]), "");
        assert!(decode_actions("").unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_entries() {
        assert!(matches!(decode_action("r-1,1"), Err(CodecError::MalformedAction(_))));
        assert!(matches!(decode_action("x-1,1-5"), Err(CodecError::UnknownActionKind(_))));
        assert!(matches!(decode_action("r-1;1-5"), Err(CodecError::InvalidCellId(_))));
        assert!(matches!(decode_action("r-1,1-soon"), Err(CodecError::InvalidElapsed(_))));
        assert!(matches!(decode_action("f-1,1--5"), Err(CodecError::InvalidElapsed(_))));
        assert!(decode_actions("r-0,0-0;;f-1,1-2").is_err());
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "00:00.000");
        assert_eq!(format_duration(7), "00:00.007");
        assert_eq!(format_duration(61_050), "01:01.050");
        assert_eq!(format_duration(3_599_999), "59:59.999");
        assert_eq!(format_duration(6_000_000), "100:00.000");
    }
}
