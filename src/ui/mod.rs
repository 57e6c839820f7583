pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, file_failed, file_updated, header, human_bytes, info, section, success,
    summary_row, timing, warn,
};
pub use progress::{FileProgress, Spinner};
pub use table::{items_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
