#![allow(clippy::needless_pass_by_value)]

pub mod app;
pub mod canvas_viewport;
pub mod filter_chips;
pub mod filter_panel;
pub mod manual_match_bar;
pub mod map_canvas;
pub mod map_page;
pub mod map_state;
pub mod problems_page;
pub mod stop_popup;
pub mod toast;
