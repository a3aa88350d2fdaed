use std::path::Path;

use crate::string_map::{StringIndex, StringMap};

///
/// A single (immutable) unit of source text
///
#[derive(Clone, Debug)]
pub struct FileData {
    data: String,
    name: StringIndex,
}


impl FileData {
    pub fn new(data: String, name: StringIndex) -> Self {
        // a tab is one column; normalising keeps the
        // renderer's column arithmetic byte-accurate
        let data = data.replace('\t', " ").replace('\r', "");
        Self { data, name }
    }


    pub fn open<P: AsRef<Path>>(path: P, string_map: &mut StringMap) -> Result<Self, std::io::Error> {
        let data = std::fs::read_to_string(&path)?;
        let name = string_map.insert(&path.as_ref().to_string_lossy());
        Ok(Self::new(data, name))
    }


    #[inline(always)]
    pub fn read(&self) -> &str { &self.data }

    #[inline(always)]
    pub fn name(&self) -> StringIndex { self.name }
}


///
/// Represents the source range of something as
/// inclusive byte offsets into its file data.
///
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct SourceRange {
    start: u32,
    end  : u32,
}


impl SourceRange {
    pub const ZERO : SourceRange = SourceRange::new(0, 0);

    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
        }
    }


    #[inline(always)]
    pub const fn start(self) -> u32 { self.start }

    #[inline(always)]
    pub const fn end(self) -> u32 { self.end }


    ///
    /// The smallest range covering both `self` and `other`
    ///
    pub const fn join(self, other: SourceRange) -> SourceRange {
        SourceRange::new(
            if self.start < other.start { self.start } else { other.start },
            if self.end > other.end { self.end } else { other.end },
        )
    }


    ///
    /// A range on the closing character of `self`
    ///
    pub const fn last_char(self) -> SourceRange {
        SourceRange::new(self.end, self.end)
    }
}
