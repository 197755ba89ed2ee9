//! Motion families and the binding names exposed to the editor's mapping
//! layer (`nmap_w`, `xmap_ge`, `omap_gE`, ...).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionFamily {
    Word,
    BigWord,
    WordEnd,
    BigWordEnd,
    WordBack,
    BigWordBack,
    WordBackEnd,
    BigWordBackEnd,
}

impl MotionFamily {
    pub const ALL: [MotionFamily; 8] = [
        MotionFamily::Word,
        MotionFamily::BigWord,
        MotionFamily::WordEnd,
        MotionFamily::BigWordEnd,
        MotionFamily::WordBack,
        MotionFamily::BigWordBack,
        MotionFamily::WordBackEnd,
        MotionFamily::BigWordBackEnd,
    ];

    /// Keys that trigger the motion natively.
    pub fn keys(self) -> &'static str {
        match self {
            MotionFamily::Word => "w",
            MotionFamily::BigWord => "W",
            MotionFamily::WordEnd => "e",
            MotionFamily::BigWordEnd => "E",
            MotionFamily::WordBack => "b",
            MotionFamily::BigWordBack => "B",
            MotionFamily::WordBackEnd => "ge",
            MotionFamily::BigWordBackEnd => "gE",
        }
    }

    pub fn from_keys(keys: &str) -> Option<MotionFamily> {
        MotionFamily::ALL.into_iter().find(|f| f.keys() == keys)
    }

    pub fn direction(self) -> Direction {
        match self {
            MotionFamily::Word
            | MotionFamily::BigWord
            | MotionFamily::WordEnd
            | MotionFamily::BigWordEnd => Direction::Forward,
            _ => Direction::Backward,
        }
    }

    /// WORD families treat every run of non-blanks as one token.
    pub fn is_big(self) -> bool {
        matches!(
            self,
            MotionFamily::BigWord
                | MotionFamily::BigWordEnd
                | MotionFamily::BigWordBack
                | MotionFamily::BigWordBackEnd
        )
    }

    /// Whether the motion includes its end character under an operator.
    pub fn is_inclusive(self) -> bool {
        matches!(
            self,
            MotionFamily::WordEnd
                | MotionFamily::BigWordEnd
                | MotionFamily::WordBackEnd
                | MotionFamily::BigWordBackEnd
        )
    }
}

impl fmt::Display for MotionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keys())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPrefix {
    Normal,
    Visual,
    OperatorPending,
}

impl BindingPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            BindingPrefix::Normal => "nmap",
            BindingPrefix::Visual => "xmap",
            BindingPrefix::OperatorPending => "omap",
        }
    }
}

/// One entry of the `{prefix}_{motion}` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub prefix: BindingPrefix,
    pub family: MotionFamily,
}

macro_rules! bindings {
    ($($prefix:ident),*) => {
        [$(
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::Word },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::BigWord },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::WordEnd },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::BigWordEnd },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::WordBack },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::BigWordBack },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::WordBackEnd },
            Binding { prefix: BindingPrefix::$prefix, family: MotionFamily::BigWordBackEnd },
        )*]
    };
}

impl Binding {
    pub const ALL: [Binding; 24] = bindings!(Normal, Visual, OperatorPending);

    pub fn new(prefix: BindingPrefix, family: MotionFamily) -> Self {
        Self { prefix, family }
    }

    pub fn name(self) -> String {
        format!("{}_{}", self.prefix.as_str(), self.family.keys())
    }

    pub fn parse(name: &str) -> Option<Binding> {
        let (prefix, keys) = name.split_once('_')?;
        let prefix = match prefix {
            "nmap" => BindingPrefix::Normal,
            "xmap" => BindingPrefix::Visual,
            "omap" => BindingPrefix::OperatorPending,
            _ => return None,
        };
        Some(Binding::new(prefix, MotionFamily::from_keys(keys)?))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.prefix.as_str(), self.family.keys())
    }
}
