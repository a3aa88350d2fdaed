use common::{source::SourceRange, string_map::StringIndex};

///
/// A type annotation as written in the source;
/// resolution happens in semantic analysis.
///
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DataType {
    range: SourceRange,
    name: StringIndex,
}


impl DataType {
    pub fn new(range: SourceRange, name: StringIndex) -> Self {
        Self { range, name }
    }


    #[inline(always)]
    pub fn name(self) -> StringIndex { self.name }

    #[inline(always)]
    pub fn range(self) -> SourceRange { self.range }
}
