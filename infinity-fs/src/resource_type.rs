use std::borrow::Cow;
use std::fmt;

/// The type code of a resource, as stored in KEY and BIF entries.
///
/// Codes the engine defines have an associated constant and a file extension.
/// Unknown codes are kept as-is so no resource is dropped from the catalog.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(pub u16);

impl ResourceType {
    pub const INVALID: Self = Self(0x0000);
    pub const BMP: Self = Self(0x0001);
    pub const MVE: Self = Self(0x0002);
    pub const WAV: Self = Self(0x0004);
    pub const WFX: Self = Self(0x0005);
    pub const PLT: Self = Self(0x0006);
    pub const TGA: Self = Self(0x03b8);
    pub const BAM: Self = Self(0x03e8);
    pub const WED: Self = Self(0x03e9);
    pub const CHU: Self = Self(0x03ea);
    pub const TIS: Self = Self(0x03eb);
    pub const MOS: Self = Self(0x03ec);
    pub const ITM: Self = Self(0x03ed);
    pub const SPL: Self = Self(0x03ee);
    pub const BCS: Self = Self(0x03ef);
    pub const IDS: Self = Self(0x03f0);
    pub const CRE: Self = Self(0x03f1);
    pub const ARE: Self = Self(0x03f2);
    pub const DLG: Self = Self(0x03f3);
    pub const TWO_DA: Self = Self(0x03f4);
    pub const GAM: Self = Self(0x03f5);
    pub const STO: Self = Self(0x03f6);
    pub const WMP: Self = Self(0x03f7);
    pub const EFF: Self = Self(0x03f8);
    pub const BS: Self = Self(0x03f9);
    pub const CHR: Self = Self(0x03fa);
    pub const VVC: Self = Self(0x03fb);
    pub const VEF: Self = Self(0x03fc);
    pub const PRO: Self = Self(0x03fd);
    pub const BIO: Self = Self(0x03fe);
    pub const WBM: Self = Self(0x03ff);
    pub const FNT: Self = Self(0x0400);
    pub const GUI: Self = Self(0x0402);
    pub const SQL: Self = Self(0x0403);
    pub const PVRZ: Self = Self(0x0404);
    pub const GLSL: Self = Self(0x0405);
    pub const TOT: Self = Self(0x0406);
    pub const TOH: Self = Self(0x0407);
    pub const MENU: Self = Self(0x0408);
    pub const LUA: Self = Self(0x0409);
    pub const TTF: Self = Self(0x040a);
    pub const PNG: Self = Self(0x040b);
    pub const BAH: Self = Self(0x044c);
    pub const INI: Self = Self(0x0802);
    pub const SRC: Self = Self(0x0803);
    pub const MAZE: Self = Self(0x0804);
    pub const MUS: Self = Self(0x0ffe);
    pub const ACM: Self = Self(0x0fff);

    const EXTENSIONS: &'static [(ResourceType, &'static str)] = &[
        (Self::BMP, "BMP"),
        (Self::MVE, "MVE"),
        (Self::WAV, "WAV"),
        (Self::WFX, "WFX"),
        (Self::PLT, "PLT"),
        (Self::TGA, "TGA"),
        (Self::BAM, "BAM"),
        (Self::WED, "WED"),
        (Self::CHU, "CHU"),
        (Self::TIS, "TIS"),
        (Self::MOS, "MOS"),
        (Self::ITM, "ITM"),
        (Self::SPL, "SPL"),
        (Self::BCS, "BCS"),
        (Self::IDS, "IDS"),
        (Self::CRE, "CRE"),
        (Self::ARE, "ARE"),
        (Self::DLG, "DLG"),
        (Self::TWO_DA, "2DA"),
        (Self::GAM, "GAM"),
        (Self::STO, "STO"),
        (Self::WMP, "WMP"),
        (Self::EFF, "EFF"),
        (Self::BS, "BS"),
        (Self::CHR, "CHR"),
        (Self::VVC, "VVC"),
        (Self::VEF, "VEF"),
        (Self::PRO, "PRO"),
        (Self::BIO, "BIO"),
        (Self::WBM, "WBM"),
        (Self::FNT, "FNT"),
        (Self::GUI, "GUI"),
        (Self::SQL, "SQL"),
        (Self::PVRZ, "PVRZ"),
        (Self::GLSL, "GLSL"),
        (Self::TOT, "TOT"),
        (Self::TOH, "TOH"),
        (Self::MENU, "MENU"),
        (Self::LUA, "LUA"),
        (Self::TTF, "TTF"),
        (Self::PNG, "PNG"),
        (Self::BAH, "BAH"),
        (Self::INI, "INI"),
        (Self::SRC, "SRC"),
        (Self::MAZE, "MAZE"),
        (Self::MUS, "MUS"),
        (Self::ACM, "ACM"),
    ];

    /// Returns the upper-case file extension for a known type.
    pub fn extension(self) -> Option<&'static str> {
        Self::EXTENSIONS
            .iter()
            .find(|(ty, _)| *ty == self)
            .map(|(_, ext)| *ext)
    }

    /// Looks up a type by its extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::EXTENSIONS
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(ext))
            .map(|(ty, _)| *ty)
    }

    /// All types with a known extension.
    pub fn known() -> impl Iterator<Item = ResourceType> {
        Self::EXTENSIONS.iter().map(|(ty, _)| *ty)
    }

    pub fn is_known(self) -> bool {
        self.extension().is_some()
    }

    /// Tilesets are addressed through the tileset locator space.
    pub fn is_tileset(self) -> bool {
        self == Self::TIS
    }

    /// The name used for file extensions and synthetic directories.
    ///
    /// Unknown codes render as `0x` followed by the big-endian code in hex.
    pub fn name(self) -> Cow<'static, str> {
        match self.extension() {
            Some(ext) => Cow::Borrowed(ext),
            None => Cow::Owned(format!("0x{}", hex::encode_upper(self.0.to_be_bytes()))),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<u16> for ResourceType {
    fn from(code: u16) -> Self {
        ResourceType(code)
    }
}
