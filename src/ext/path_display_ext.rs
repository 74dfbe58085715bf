use std::path::{Component, Path, PathBuf};

/// Renders a path for log lines and error messages.
///
/// Existing paths are canonicalized. Paths that cannot be canonicalized (typically because they do
/// not exist) are made absolute against the working directory and lexically normalized instead.
pub trait PathDisplayExt {
    fn display_absolute(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> PathDisplayExt for P {
    fn display_absolute(&self) -> String {
        let path = self.as_ref();
        if let Ok(canonical) = path.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        lexically_normalize(&absolute).display().to_string()
    }
}

fn lexically_normalize(path: &Path) -> PathBuf {
    let mut kept: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match kept.last() {
                Some(Component::Normal(_)) => {
                    kept.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => kept.push(component),
            },
            _ => kept.push(component),
        }
    }

    kept.iter().collect()
}
