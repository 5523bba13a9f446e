//! The fixed set of Visual C++ redistributables handled by every phase.

/// One row of the catalog: the package-manager key and a readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub identifier: &'static str,
    pub display_name: &'static str,
}

const ENTRIES: [PackageEntry; 12] = [
    entry("Microsoft.VCRedist.2005.x86", "VC++ 2005 x86"),
    entry("Microsoft.VCRedist.2005.x64", "VC++ 2005 x64"),
    entry("Microsoft.VCRedist.2008.x86", "VC++ 2008 x86"),
    entry("Microsoft.VCRedist.2008.x64", "VC++ 2008 x64"),
    entry("Microsoft.VCRedist.2010.x86", "VC++ 2010 x86"),
    entry("Microsoft.VCRedist.2010.x64", "VC++ 2010 x64"),
    entry("Microsoft.VCRedist.2012.x86", "VC++ 2012 x86"),
    entry("Microsoft.VCRedist.2012.x64", "VC++ 2012 x64"),
    entry("Microsoft.VCRedist.2013.x86", "VC++ 2013 x86"),
    entry("Microsoft.VCRedist.2013.x64", "VC++ 2013 x64"),
    entry("Microsoft.VCRedist.2015+.x86", "VC++ 2015–2022 x86"),
    entry("Microsoft.VCRedist.2015+.x64", "VC++ 2015–2022 x64"),
];

const fn entry(identifier: &'static str, display_name: &'static str) -> PackageEntry {
    PackageEntry {
        identifier,
        display_name,
    }
}

/// All catalog entries, oldest release first and x86 before x64.
pub fn list() -> Vec<PackageEntry> {
    ENTRIES.to_vec()
}

/// Look up an entry by identifier, ignoring case.
pub fn find(identifier: &str) -> Option<PackageEntry> {
    ENTRIES
        .iter()
        .find(|e| e.identifier.eq_ignore_ascii_case(identifier))
        .cloned()
}
