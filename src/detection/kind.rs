crate::define_label_enum! {
    /// Build-system family of a repository, as recorded in `build_type`
    BuildSystemKind {
        Meson => "MESON",
        CMake => "CMAKE",
        Autotools => "AUTOTOOLS",
        Python => "PYTHON",
        Perl => "PERL",
        QMake => "QMAKE",
        Makefile => "MAKEFILE",
        /// No marker matched
        Other => "OTHER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&BuildSystemKind::CMake).unwrap(),
            "\"CMAKE\""
        );
        assert_eq!(
            serde_json::to_string(&BuildSystemKind::QMake).unwrap(),
            "\"QMAKE\""
        );
    }

    #[test]
    fn test_kind_deserialization() {
        let kind: BuildSystemKind = serde_json::from_str("\"AUTOTOOLS\"").unwrap();
        assert_eq!(kind, BuildSystemKind::Autotools);

        assert!(serde_json::from_str::<BuildSystemKind>("\"BAZEL\"").is_err());
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("meson".parse::<BuildSystemKind>(), Ok(BuildSystemKind::Meson));
        assert_eq!("Makefile".parse::<BuildSystemKind>(), Ok(BuildSystemKind::Makefile));
        assert!("scons".parse::<BuildSystemKind>().is_err());
    }

    #[test]
    fn test_all_variants_closed_set() {
        assert_eq!(BuildSystemKind::all_variants().len(), 8);
        assert_eq!(BuildSystemKind::Other.to_string(), "OTHER");
    }
}
