pub mod panels;
pub mod sankey_view;
