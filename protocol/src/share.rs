use dailymines_core::LeaderboardItem;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::*;

/// Query parameter carrying a shared game.
pub const SHARE_PARAM: &str = "game";

/// Characters escaped the way browsers' `encodeURIComponent` does.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `?game=<percent-encoded stored game>` for `item`.
pub fn share_query(item: &LeaderboardItem) -> Result<String, CodecError> {
    let json = StoredGame::from(item).to_json()?;
    Ok(format!("?{SHARE_PARAM}={}", utf8_percent_encode(&json, COMPONENT)))
}

pub fn share_url(origin: &str, item: &LeaderboardItem) -> Result<String, CodecError> {
    Ok(format!("{}/{}", origin.trim_end_matches('/'), share_query(item)?))
}

/// Decodes a shared game from a link, a query string or a bare payload.
///
/// `Ok(None)` when there is no game parameter at all.
pub fn parse_shared_game(link: &str) -> Result<Option<LeaderboardItem>, CodecError> {
    let Some(payload) = game_param(link) else {
        return Ok(None);
    };
    let unplussed = payload.replace('+', " ");
    let json = percent_decode_str(&unplussed).decode_utf8()?;
    StoredGame::from_json(&json)?.into_item().map(Some)
}

/// Like [`parse_shared_game`], logging and ignoring malformed payloads.
pub fn shared_game(link: &str) -> Option<LeaderboardItem> {
    match parse_shared_game(link) {
        Ok(item) => item,
        Err(err) => {
            log::warn!("Ignoring malformed shared game: {}", err);
            None
        }
    }
}

fn game_param(link: &str) -> Option<&str> {
    let trimmed = link.trim();
    if trimmed.starts_with('{') || trimmed.starts_with("%7B") {
        return Some(trimmed);
    }

    let query = match trimmed.split_once('?') {
        Some((_, query)) => query,
        None => trimmed,
    };
    let query = query.split('#').next().unwrap_or(query);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| value)
}
