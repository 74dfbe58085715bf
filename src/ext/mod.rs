mod path_display_ext;

pub use path_display_ext::PathDisplayExt;
