use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A drum loop or backing track available to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub file: String,
}

impl Track {
    pub fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self { title: title.into(), file: file.into() }
    }
}

/// Fixed list of tracks plus the directory they live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrumLibrary {
    directory: PathBuf,
    tracks: Vec<Track>,
}

impl DrumLibrary {
    pub fn new(directory: impl Into<PathBuf>, tracks: Vec<Track>) -> Self {
        Self { directory: directory.into(), tracks }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Full path of a track, `None` if the index is out of range.
    pub fn path_of(&self, index: usize) -> Option<PathBuf> {
        self.get(index).map(|t| self.directory.join(&t.file))
    }
}

impl Default for DrumLibrary {
    fn default() -> Self {
        Self::new(
            "/home/pi",
            vec![
                Track::new("Kick", "kick-180bpm.wav"),
                Track::new("GnR", "GnR-Paradise_City.wav"),
                Track::new("FF", "FF-Pretender.wav"),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_joins_directory() {
        let lib = DrumLibrary::default();
        assert_eq!(
            lib.path_of(1),
            Some(PathBuf::from("/home/pi/GnR-Paradise_City.wav"))
        );
        assert_eq!(lib.path_of(3), None);
    }
}
