//! Ordered signature table for build-system detection
//!
//! Detection is "first match in priority order", not "best match": the
//! detector walks [`SIGNATURES`] top to bottom and stops at the first
//! signature with a matching marker. Within a signature, markers are tried
//! in order as well, and the first one that matches supplies the evidence.

use super::BuildSystemKind;
use crate::fs::FileSystem;
use std::path::Path;

/// One way a signature can be satisfied at the repository root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// A single required entry; evidence is that name
    File(&'static str),

    /// A required entry plus an optional companion included when present
    WithCompanion {
        required: &'static str,
        companion: &'static str,
    },

    /// Any of the entries; evidence is every present one, in table order
    AnyOf(&'static [&'static str]),

    /// Any root entry with this extension; evidence is a single match
    Extension(&'static str),
}

impl Marker {
    /// Returns the evidence when this marker matches at `root`
    pub fn collect(&self, root: &Path, fs: &dyn FileSystem) -> Option<Vec<String>> {
        match self {
            Marker::File(name) => fs
                .exists(&root.join(name))
                .then(|| vec![name.to_string()]),
            Marker::WithCompanion {
                required,
                companion,
            } => {
                if !fs.exists(&root.join(required)) {
                    return None;
                }
                let mut evidence = vec![required.to_string()];
                if fs.exists(&root.join(companion)) {
                    evidence.push(companion.to_string());
                }
                Some(evidence)
            }
            Marker::AnyOf(names) => {
                let evidence: Vec<String> = names
                    .iter()
                    .filter(|name| fs.exists(&root.join(name)))
                    .map(|name| name.to_string())
                    .collect();
                (!evidence.is_empty()).then_some(evidence)
            }
            Marker::Extension(ext) => first_with_extension(root, ext, fs).map(|name| vec![name]),
        }
    }
}

/// Smallest root entry name (byte order) ending in `.<ext>`.
///
/// Listing order differs between platforms and file systems, so the choice
/// does not depend on it.
fn first_with_extension(root: &Path, ext: &str, fs: &dyn FileSystem) -> Option<String> {
    let entries = match fs.read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "Cannot list repository root");
            return None;
        }
    };

    let suffix = format!(".{}", ext);
    entries
        .into_iter()
        .map(|entry| entry.name)
        .filter(|name| name.ends_with(&suffix))
        .min()
}

/// A build-system family and the markers that identify it
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub kind: BuildSystemKind,
    pub markers: &'static [Marker],
}

impl Signature {
    pub fn evaluate(&self, root: &Path, fs: &dyn FileSystem) -> Option<Vec<String>> {
        self.markers.iter().find_map(|marker| marker.collect(root, fs))
    }
}

/// Signatures in priority order, highest first. `OTHER` has no entry: it is
/// the fallback when nothing here matches.
pub const SIGNATURES: &[Signature] = &[
    Signature {
        kind: BuildSystemKind::Meson,
        markers: &[Marker::WithCompanion {
            required: "meson.build",
            companion: "meson_options.txt",
        }],
    },
    Signature {
        kind: BuildSystemKind::CMake,
        markers: &[Marker::File("CMakeLists.txt")],
    },
    Signature {
        kind: BuildSystemKind::Autotools,
        markers: &[
            Marker::File("bootstrap"),
            Marker::File("autogen.sh"),
            Marker::AnyOf(&["configure", "configure.ac", "configure.in"]),
        ],
    },
    Signature {
        kind: BuildSystemKind::Python,
        markers: &[
            Marker::File("pyproject.toml"),
            Marker::AnyOf(&["setup.py", "setup.cfg"]),
        ],
    },
    Signature {
        kind: BuildSystemKind::Perl,
        markers: &[Marker::File("Makefile.PL")],
    },
    Signature {
        kind: BuildSystemKind::QMake,
        markers: &[Marker::Extension("pro")],
    },
    Signature {
        kind: BuildSystemKind::Makefile,
        markers: &[Marker::File("Makefile")],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use yare::parameterized;

    fn tree(files: &[&str]) -> MockFileSystem {
        let fs = MockFileSystem::new();
        for file in files {
            fs.add_file(file);
        }
        fs
    }

    fn signature(kind: BuildSystemKind) -> Signature {
        *SIGNATURES
            .iter()
            .find(|s| s.kind == kind)
            .expect("signature must exist")
    }

    #[test]
    fn test_signature_order_is_fixed() {
        let order: Vec<BuildSystemKind> = SIGNATURES.iter().map(|s| s.kind).collect();
        assert_eq!(
            order,
            vec![
                BuildSystemKind::Meson,
                BuildSystemKind::CMake,
                BuildSystemKind::Autotools,
                BuildSystemKind::Python,
                BuildSystemKind::Perl,
                BuildSystemKind::QMake,
                BuildSystemKind::Makefile,
            ]
        );
    }

    #[parameterized(
        meson_alone = { BuildSystemKind::Meson, &["meson.build"], &["meson.build"] },
        meson_with_options = { BuildSystemKind::Meson, &["meson_options.txt", "meson.build"], &["meson.build", "meson_options.txt"] },
        cmake = { BuildSystemKind::CMake, &["CMakeLists.txt"], &["CMakeLists.txt"] },
        bootstrap_wins_over_configure = { BuildSystemKind::Autotools, &["configure", "bootstrap"], &["bootstrap"] },
        autogen_wins_over_configure = { BuildSystemKind::Autotools, &["configure.ac", "autogen.sh"], &["autogen.sh"] },
        configure_family_collects_all = { BuildSystemKind::Autotools, &["configure.in", "configure"], &["configure", "configure.in"] },
        pyproject_alone = { BuildSystemKind::Python, &["setup.py", "pyproject.toml"], &["pyproject.toml"] },
        setup_family_collects_all = { BuildSystemKind::Python, &["setup.cfg", "setup.py"], &["setup.py", "setup.cfg"] },
        setup_cfg_only = { BuildSystemKind::Python, &["setup.cfg"], &["setup.cfg"] },
        perl = { BuildSystemKind::Perl, &["Makefile.PL"], &["Makefile.PL"] },
        qmake = { BuildSystemKind::QMake, &["app.pro"], &["app.pro"] },
        makefile = { BuildSystemKind::Makefile, &["Makefile"], &["Makefile"] },
    )]
    fn test_signature_evidence(kind: BuildSystemKind, files: &[&str], expected: &[&str]) {
        let fs = tree(files);
        let evidence = signature(kind).evaluate(fs.root(), &fs).unwrap();
        assert_eq!(evidence, expected);
    }

    #[parameterized(
        meson_needs_build_file = { BuildSystemKind::Meson, &["meson_options.txt"] },
        cmake_is_case_sensitive = { BuildSystemKind::CMake, &["cmakelists.txt"] },
        perl_needs_pl = { BuildSystemKind::Perl, &["Makefile"] },
        qmake_needs_extension = { BuildSystemKind::QMake, &["pro", "app.pri"] },
        makefile_lowercase = { BuildSystemKind::Makefile, &["makefile"] },
    )]
    fn test_signature_no_match(kind: BuildSystemKind, files: &[&str]) {
        let fs = tree(files);
        assert!(signature(kind).evaluate(fs.root(), &fs).is_none());
    }

    #[test]
    fn test_marker_matches_directories() {
        let fs = MockFileSystem::new();
        fs.add_dir("configure");

        let evidence = Marker::AnyOf(&["configure", "configure.ac"])
            .collect(fs.root(), &fs)
            .unwrap();
        assert_eq!(evidence, vec!["configure"]);
    }

    #[test]
    fn test_extension_choice_ignores_listing_order() {
        let forward = tree(&["alpha.pro", "beta.pro", "gamma.pro"]);
        let reverse = tree(&["gamma.pro", "beta.pro", "alpha.pro"]);

        let marker = Marker::Extension("pro");
        assert_eq!(
            marker.collect(forward.root(), &forward),
            Some(vec!["alpha.pro".to_string()])
        );
        assert_eq!(
            marker.collect(reverse.root(), &reverse),
            Some(vec!["alpha.pro".to_string()])
        );
    }

    #[test]
    fn test_extension_only_looks_at_root() {
        let fs = tree(&["tools/editor.pro"]);
        assert!(Marker::Extension("pro").collect(fs.root(), &fs).is_none());
    }

    #[test]
    fn test_extension_unreadable_root() {
        let fs = MockFileSystem::new();
        assert!(Marker::Extension("pro")
            .collect(Path::new("/elsewhere"), &fs)
            .is_none());
    }
}
