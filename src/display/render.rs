use std::fmt::Write;

use crate::search::{SearchState, SearchStatus};
use crate::selection::{DetailState, DetailStatus};
use crate::stats::{format_mean, WatchedSummary};
use crate::watched::{RatingAffordance, WatchedList, MAX_RATING};

pub fn help_text() -> String {
    format!(
        "Commands:
  <text> | search <text>   search movies (an empty line clears the search)
  open <n|imdbID>          show details of a result
  rate <1-{MAX_RATING}>              rate the open movie
  add                      add the open movie to your watched list
  close                    close the open movie
  watched                  show your watched list
  remove <n|imdbID>        remove a movie from your watched list
  stats                    show watched list statistics
  help                     show this help
  quit                     exit"
    )
}

pub fn search_view(state: &SearchState) -> String {
    match &state.status {
        SearchStatus::Idle => "Type a title to search movies".to_string(),
        SearchStatus::Loading => "Loading...".to_string(),
        SearchStatus::Failed(message) => format!("✖ {message}"),
        SearchStatus::Loaded(results) => {
            let mut out = format!("Found {} results", results.len());
            for (i, movie) in results.iter().enumerate() {
                let _ = write!(out, "\n  {:>2}. {} ({})  [{}]", i + 1, movie.title, movie.year, movie.imdb_id);
            }
            out
        }
    }
}

pub fn detail_view(state: &DetailState, affordance: RatingAffordance) -> String {
    let detail = match &state.status {
        DetailStatus::Closed => return "No movie is open".to_string(),
        DetailStatus::Loading => return "Loading...".to_string(),
        DetailStatus::Failed(message) => return format!("✖ {message}"),
        DetailStatus::Loaded(detail) => detail,
    };

    let mut out = format!(
        "{}\n{} • {}\n{}\n⭐️ {} IMDb rating\n\n{}\nStarring {}\nDirected by {}\n",
        detail.title,
        detail.released,
        detail.runtime,
        detail.genre,
        detail.imdb_rating,
        detail.plot,
        detail.actors,
        detail.director,
    );

    match affordance {
        RatingAffordance::AlreadyRated(rating) => {
            let rating = rating.map_or_else(|| "N/A".to_string(), |r| r.to_string());
            let _ = write!(out, "\nYou rated this movie {rating} ⭐️");
        }
        RatingAffordance::CanRate => match state.draft.rating {
            Some(rating) => {
                let _ = write!(out, "\nYour rating: {rating}/{MAX_RATING}. Type `add` to add it to your list");
            }
            None => {
                let _ = write!(out, "\nRate it with `rate <1-{MAX_RATING}>`, then `add`");
            }
        },
    }
    out
}

pub fn watched_view(list: &WatchedList) -> String {
    if list.is_empty() {
        return "You have not added any movies yet".to_string();
    }

    let mut out = String::new();
    for (i, movie) in list.entries().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "  {:>2}. {}  ⭐️ {}  🌟 {}  ⏳ {} min  [{}]",
            i + 1,
            movie.title,
            format_mean(movie.imdb_rating),
            movie.user_rating.map_or_else(|| "N/A".to_string(), |r| r.to_string()),
            movie.runtime,
            movie.imdb_id,
        );
    }
    out
}

pub fn summary_view(summary: &WatchedSummary) -> String {
    format!("Movies you watched\n{summary}")
}
