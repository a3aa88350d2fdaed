use std::collections::HashMap;

use sti::arena::Arena;

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Debug, Hash)]
pub struct StringIndex(u32);


pub struct StringMap<'a> {
    arena: &'a Arena,
    map: HashMap<&'a str, StringIndex>,
    vec: Vec<&'a str>,
}


impl<'a> StringMap<'a> {
    pub const BOOL : StringIndex = StringIndex(0);
    pub const I32  : StringIndex = StringIndex(1);
    pub const F64  : StringIndex = StringIndex(2);

    pub fn new(arena: &'a Arena) -> Self {
        let mut slf = Self {
            arena,
            map: HashMap::new(),
            vec: Vec::new(),
        };

        assert_eq!(slf.insert("bool"), Self::BOOL);
        assert_eq!(slf.insert("i32"), Self::I32);
        assert_eq!(slf.insert("f64"), Self::F64);

        slf
    }


    #[inline(always)]
    pub fn insert(&mut self, value: &str) -> StringIndex {
        if let Some(key) = self.map.get(value) {
            return *key
        }

        let string = self.arena.alloc_str(value);

        debug_assert!(self.vec.len() < u32::MAX as usize);

        let index = StringIndex(self.vec.len() as u32);
        self.vec.push(string);
        self.map.insert(string, index);
        index
    }


    #[inline(always)]
    pub fn get(&self, index: StringIndex) -> &'a str {
        self.vec[index.0 as usize]
    }


    #[inline(always)]
    pub fn len(&self) -> usize { self.vec.len() }


    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.vec.is_empty() }
}


impl std::fmt::Debug for StringMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringMap {{ {:?} }}", self.vec)
    }
}


impl PartialEq for StringMap<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.vec == other.vec
    }
}
