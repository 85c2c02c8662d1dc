//! Output sinks for ranked tables.
//!
//! # Submodules
//!
//! - [`csv_file`]: Writes a [`RankedTable`](crate::models::RankedTable) as a CSV file
//! - [`dump`]: Writes the raw API response when normalization found nothing usable
//! - [`preview`]: Renders a compact text table for the console
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── apple_podcast_rankings_2025-05-06.csv
//! ├── apple_podcast_rankings_genre_2025-05-06.csv     # fallback source
//! ├── spotify_podcast_rankings_2025-05-06.csv
//! ├── spotify_podcast_rankings_trending_2025-05-06.csv # fallback source
//! ├── podscribe_podcast_rankings_2025-05-06.csv
//! └── spotify_api_response_debug.json                  # only when every title was unknown
//! ```

pub mod csv_file;
pub mod dump;
pub mod preview;
