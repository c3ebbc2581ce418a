use colored::Colorize;
use tabled::Table;

use crate::{
    management::Session,
    types::{Track, TrackTableRow},
};

pub const TITLE: &str = "Spotify Recommendations Based on Your Top Tracks";
pub const LOADING_TOP_TRACKS: &str = "Loading your top tracks...";
pub const LOADING_RECOMMENDATIONS: &str = "Loading recommendations...";

/// Draws the whole session screen.
///
/// Mirrors what the user can do right now: a login hint while anonymous,
/// the two track tables once they are known, a placeholder for each list
/// still missing and the controls with their in-flight labels.
pub fn render_session(session: &Session, login_url: &str) -> String {
    let mut out = vec![TITLE.bold().to_string()];

    if !session.is_logged_in() {
        out.push(format!("Log in to Spotify: {}", login_url));
        return out.join("\n\n");
    }

    let top_tracks = session.top_tracks();
    let recommendations = session.recommendations();

    if !top_tracks.is_empty() {
        out.push("Your Top Tracks".bold().to_string());
        out.push(track_table(top_tracks));
    }

    if !recommendations.is_empty() {
        out.push("Recommended Songs".bold().to_string());
        out.push(track_table(recommendations));
        out.push(controls(session));
    }

    if top_tracks.is_empty() {
        out.push(LOADING_TOP_TRACKS.to_string());
    } else if recommendations.is_empty() {
        out.push(LOADING_RECOMMENDATIONS.to_string());
    }

    out.join("\n\n")
}

fn track_table(tracks: &[Track]) -> String {
    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    Table::new(rows).to_string()
}

fn controls(session: &Session) -> String {
    let create = if session.is_creating_playlist() {
        "Creating Playlist...".dimmed().to_string()
    } else {
        "[c] Create Playlist".to_string()
    };

    let shuffle = if session.is_shuffling() {
        "Shuffling...".dimmed().to_string()
    } else {
        "[s] Shuffle".to_string()
    };

    format!("{}   {}   [r] Redraw   [q] Quit", create, shuffle)
}
