//! Release fixtures

use chrono::{DateTime, TimeZone, Utc};

use release_index::release::types::{
    Architecture, Binary, HeapSize, ImageType, JvmVariant, Os, Package, Project, Release,
    ReleaseKind, Vendor,
};
use release_index::version::VersionParser;

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

/// Builds a GA release whose version is parsed from its name
pub struct ReleaseBuilder {
    release: Release,
}

impl ReleaseBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            release: Release {
                id: id.to_string(),
                release_kind: ReleaseKind::Ga,
                name: name.to_string(),
                link: format!("https://example.test/releases/{name}"),
                timestamp: at(1),
                updated_at: at(1),
                vendor: Vendor::Eclipse,
                version_data: VersionParser::new().parse_release_name(name).unwrap(),
                download_count: 0,
                binaries: Vec::new(),
                source: None,
            },
        }
    }

    pub fn kind(mut self, kind: ReleaseKind) -> Self {
        self.release.release_kind = kind;
        self
    }

    pub fn vendor(mut self, vendor: Vendor) -> Self {
        self.release.vendor = vendor;
        self
    }

    pub fn published(mut self, day: u32) -> Self {
        self.release.timestamp = at(day);
        self.release.updated_at = at(day);
        self
    }

    pub fn binary(mut self, os: Os, architecture: Architecture, image_type: ImageType) -> Self {
        let updated_at = self.release.updated_at;
        self.release.binaries.push(Binary {
            os,
            architecture,
            image_type,
            jvm_variant: JvmVariant::Hotspot,
            heap_size: HeapSize::Normal,
            project: Project::Jdk,
            updated_at,
            download_count: 0,
            package: Package {
                name: format!("{}-{}-{}.tar.gz", image_type, os, architecture),
                link: format!("https://example.test/{}/{}-{}", self.release.id, os, architecture),
                size: 1024,
                checksum: None,
                signature_link: None,
            },
        });
        self
    }

    /// Adds a linux x64 JDK binary when none was configured
    pub fn build(self) -> Release {
        if self.release.binaries.is_empty() {
            return self.binary(Os::Linux, Architecture::X64, ImageType::Jdk).release;
        }
        self.release
    }
}
