mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    render_catalog_list,
    render_clear_confirmation,
    render_detail,
    render_favorites,
    render_header,
    render_help_screen,
    render_search_overlay,
    render_status_bar,
    season_label,
};
