//! Release records and their vocabularies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::model::VersionModel;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed string vocabulary with its wire names
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident: $kind:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$variant_meta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// General availability or early access
    ReleaseKind: "release kind" {
        Ga => "ga",
        Ea => "ea",
    }
}

vocabulary! {
    Vendor: "vendor" {
        AdoptOpenJdk => "adoptopenjdk",
        OpenJdk => "openjdk",
        Eclipse => "eclipse",
        Alibaba => "alibaba",
    }
}

vocabulary! {
    Os: "os" {
        Linux => "linux",
        AlpineLinux => "alpine-linux",
        Windows => "windows",
        Mac => "mac",
        Solaris => "solaris",
        Aix => "aix",
    }
}

vocabulary! {
    Architecture: "architecture" {
        X64 => "x64",
        X86 => "x86",
        X32 => "x32",
        Ppc64 => "ppc64",
        Ppc64le => "ppc64le",
        S390x => "s390x",
        Aarch64 => "aarch64",
        Arm => "arm",
        Sparcv9 => "sparcv9",
        Riscv64 => "riscv64",
    }
}

vocabulary! {
    ImageType: "image type" {
        Jdk => "jdk",
        Jre => "jre",
        TestImage => "testimage",
        DebugImage => "debugimage",
        StaticLibs => "staticlibs",
        Sources => "sources",
    }
}

vocabulary! {
    JvmVariant: "jvm variant" {
        Hotspot => "hotspot",
        OpenJ9 => "openj9",
        Corretto => "corretto",
        Dragonwell => "dragonwell",
    }
}

vocabulary! {
    HeapSize: "heap size" {
        Normal => "normal",
        Large => "large",
    }
}

vocabulary! {
    Project: "project" {
        /// The primary project; binaries are filtered to it unless another is requested
        Jdk => "jdk",
        Valhalla => "valhalla",
        Metropolis => "metropolis",
        Jfr => "jfr",
        Shenandoah => "shenandoah",
    }
}

impl Project {
    pub const PRIMARY: Project = Project::Jdk;
}

/// Downloadable archive attached to a binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub link: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePackage {
    pub name: String,
    pub link: String,
    pub size: u64,
}

/// One platform build attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub os: Os,
    pub architecture: Architecture,
    pub image_type: ImageType,
    #[serde(rename = "jvm_impl")]
    pub jvm_variant: JvmVariant,
    pub heap_size: HeapSize,
    #[serde(default = "default_project")]
    pub project: Project,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub download_count: u64,
    pub package: Package,
}

fn default_project() -> Project {
    Project::PRIMARY
}

/// A tagged release and its binaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Globally unique identity
    pub id: String,
    #[serde(rename = "release_type")]
    pub release_kind: ReleaseKind,
    #[serde(rename = "release_name")]
    pub name: String,
    #[serde(rename = "release_link")]
    pub link: String,
    /// Publication time
    pub timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vendor: Vendor,
    pub version_data: VersionModel,
    #[serde(default)]
    pub download_count: u64,
    pub binaries: Vec<Binary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourcePackage>,
}

impl Release {
    /// Major version line this release belongs to
    pub fn feature_version(&self) -> u32 {
        self.version_data.major
    }

    /// Copy of this release keeping only the binaries accepted by `keep`
    pub fn retain_binaries<F>(&self, keep: F) -> Release
    where
        F: Fn(&Binary) -> bool,
    {
        Release {
            binaries: self.binaries.iter().filter(|&b| keep(b)).cloned().collect(),
            ..self.clone()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ga", Ok(ReleaseKind::Ga))]
    #[case("ea", Ok(ReleaseKind::Ea))]
    #[case("GA", Err(UnknownValue { kind: "release kind", value: "GA".to_string() }))]
    fn release_kind_from_str_returns_expected(
        #[case] input: &str,
        #[case] expected: Result<ReleaseKind, UnknownValue>,
    ) {
        assert_eq!(input.parse::<ReleaseKind>(), expected);
    }

    #[test]
    fn every_vocabulary_value_round_trips_through_its_wire_name() {
        for os in Os::ALL {
            assert_eq!(os.as_str().parse::<Os>(), Ok(*os));
        }
        for architecture in Architecture::ALL {
            assert_eq!(architecture.as_str().parse::<Architecture>(), Ok(*architecture));
        }
        for image_type in ImageType::ALL {
            assert_eq!(image_type.as_str().parse::<ImageType>(), Ok(*image_type));
        }
    }

    #[test]
    fn binary_deserializes_with_primary_project_by_default() {
        let binary: Binary = serde_json::from_value(serde_json::json!({
            "os": "alpine-linux",
            "architecture": "aarch64",
            "image_type": "jre",
            "jvm_impl": "hotspot",
            "heap_size": "normal",
            "updated_at": "2024-01-01T00:00:00Z",
            "package": { "name": "a.tar.gz", "link": "https://example.test/a", "size": 1 }
        }))
        .unwrap();

        assert_eq!(binary.os, Os::AlpineLinux);
        assert_eq!(binary.project, Project::PRIMARY);
        assert_eq!(binary.download_count, 0);
    }

    #[test]
    fn retain_binaries_copies_without_touching_the_original() {
        let mut original = release("r1", "jdk-11.0.4+11", 1);
        original
            .binaries
            .push(binary(Os::Windows, Architecture::X64, ImageType::Jre));

        let filtered = original.retain_binaries(|b| b.os == Os::Windows);

        assert_eq!(filtered.binaries.len(), 1);
        assert_eq!(original.binaries.len(), 2);
        assert_eq!(filtered.id, original.id);
    }
}
