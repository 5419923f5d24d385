//! Known Visual Studio releases.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::VcError;

/// A supported Visual Studio release: its year label and internal version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VsVersion {
    name: &'static str,
    ordinal: u32,
}

/// First release using the `VC\Auxiliary\Build` layout.
const NESTED_LAYOUT_ORDINAL: u32 = 15;

impl VsVersion {
    pub const VS2012: VsVersion = VsVersion::new("2012", 11);
    pub const VS2013: VsVersion = VsVersion::new("2013", 12);
    pub const VS2015: VsVersion = VsVersion::new("2015", 14);
    pub const VS2017: VsVersion = VsVersion::new("2017", 15);

    /// All known versions, oldest first.
    pub const ALL: [VsVersion; 4] = [Self::VS2012, Self::VS2013, Self::VS2015, Self::VS2017];

    const fn new(name: &'static str, ordinal: u32) -> Self {
        VsVersion { name, ordinal }
    }

    /// Look up a version by its year label.
    pub fn from_name(name: &str) -> Option<VsVersion> {
        Self::ALL.iter().copied().find(|v| v.name == name)
    }

    /// Known versions from newest to oldest.
    pub fn newest_first() -> impl Iterator<Item = VsVersion> {
        let mut all = Self::ALL;
        all.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));
        all.into_iter()
    }

    /// Year label, e.g. `"2015"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Internal version number, e.g. `14` for 2015.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// `VS{N}0COMNTOOLS`, pointing at `<root>\Common7\Tools`.
    pub fn tools_env_var(&self) -> String {
        format!("VS{}0COMNTOOLS", self.ordinal)
    }

    /// Value name under the SxS\VS7 registry key.
    pub fn registry_value_name(&self) -> String {
        format!("{}.0", self.ordinal)
    }

    /// Location of `vcvarsall.bat` below an install root.
    pub fn setup_script(&self, install_dir: &Path) -> PathBuf {
        let vc = install_dir.join("VC");
        if self.ordinal < NESTED_LAYOUT_ORDINAL {
            vc.join("vcvarsall.bat")
        } else {
            vc.join("Auxiliary").join("Build").join("vcvarsall.bat")
        }
    }
}

impl fmt::Display for VsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for VsVersion {
    type Err = VcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VsVersion::from_name(s).ok_or_else(|| VcError::Version {
            name: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(VsVersion::from_name("2015"), Some(VsVersion::VS2015));
        assert_eq!(VsVersion::from_name("2015").unwrap().ordinal(), 14);
        assert!(VsVersion::from_name("2010").is_none());
        assert!(matches!(
            "2019".parse::<VsVersion>(),
            Err(VcError::Version { name }) if name == "2019"
        ));
    }

    #[test]
    fn test_newest_first() {
        let ordinals: Vec<u32> = VsVersion::newest_first().map(|v| v.ordinal()).collect();
        assert_eq!(ordinals, vec![15, 14, 12, 11]);
    }

    #[test]
    fn test_lookup_names() {
        assert_eq!(VsVersion::VS2013.tools_env_var(), "VS120COMNTOOLS");
        assert_eq!(VsVersion::VS2017.registry_value_name(), "15.0");
    }

    #[test]
    fn test_setup_script_layout() {
        let root = Path::new("vs");
        assert_eq!(
            VsVersion::VS2015.setup_script(root),
            root.join("VC").join("vcvarsall.bat")
        );
        assert_eq!(
            VsVersion::VS2017.setup_script(root),
            root.join("VC")
                .join("Auxiliary")
                .join("Build")
                .join("vcvarsall.bat")
        );
    }
}
