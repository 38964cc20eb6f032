//! The shape of a type document.

/// Member list an `excludes` entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberList {
    /// `events`.
    Events,
    /// `methods`.
    Methods,
    /// `properties`.
    Properties,
}

impl MemberList {
    /// Key of the list in a type document.
    pub fn key(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Methods => "methods",
            Self::Properties => "properties",
        }
    }
}

/// Check applied to a scalar-ish value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// `true` or `false`.
    Boolean,
    /// Any string.
    String,
    /// String of ASCII characters.
    AsciiString,
    /// ASCII string, lowercase recommended.
    LowercaseAsciiString,
    /// Markdown text.
    Markdown,
    /// Name of a documented type.
    Class,
    /// One or many constant references.
    Constants,
    /// Type expression or list of them.
    DataType,
    /// Default value.
    Default,
    /// Number.
    Number,
    /// `osver` block.
    OsVersions,
    /// Boolean, number or string.
    Primitive,
    /// `returns` block.
    Returns,
    /// `since` version, possibly per platform.
    Since,
    /// `deprecated.removed` version.
    Removed,
    /// Platform name list.
    Platforms,
    /// Property availability.
    Availability,
    /// Property permission.
    Permission,
    /// A key that must not be used.
    Invalid,
    /// Names of members declared on the type or its ancestors.
    Names(MemberList),
}

/// How a key's value is checked.
#[derive(Debug, Clone, Copy)]
pub enum Syntax {
    /// A single check.
    Leaf(Check),
    /// A nested mapping.
    Object(&'static Schema),
    /// A sequence of mappings.
    List(&'static Schema),
}

/// A key and its syntax.
#[derive(Debug)]
pub struct Field {
    /// Key name.
    pub key: &'static str,
    /// Expected value.
    pub syntax: Syntax,
}

/// Required and optional keys of a mapping.
#[derive(Debug)]
pub struct Schema {
    /// Keys that must be present.
    pub required: &'static [Field],
    /// Keys that may be present.
    pub optional: &'static [Field],
}

impl Schema {
    /// Whether `key` is declared at all.
    pub fn declares(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Looks up a declared key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.required
            .iter()
            .chain(self.optional)
            .find(|f| f.key == key)
    }
}

/// Shorthand for a leaf field.
const fn leaf(key: &'static str, check: Check) -> Field {
    Field {
        key,
        syntax: Syntax::Leaf(check),
    }
}

/// Shorthand for a nested mapping field.
const fn object(key: &'static str, schema: &'static Schema) -> Field {
    Field {
        key,
        syntax: Syntax::Object(schema),
    }
}

/// Shorthand for a list field.
const fn list(key: &'static str, schema: &'static Schema) -> Field {
    Field {
        key,
        syntax: Syntax::List(schema),
    }
}

/// `examples` entries.
pub static EXAMPLE: Schema = Schema {
    required: &[leaf("title", Check::String), leaf("example", Check::Markdown)],
    optional: &[],
};

/// `deprecated` blocks.
pub static DEPRECATED: Schema = Schema {
    required: &[leaf("since", Check::Since)],
    optional: &[leaf("removed", Check::Removed), leaf("notes", Check::String)],
};

/// `excludes` blocks.
pub static EXCLUDES: Schema = Schema {
    required: &[],
    optional: &[
        leaf("events", Check::Names(MemberList::Events)),
        leaf("methods", Check::Names(MemberList::Methods)),
        leaf("properties", Check::Names(MemberList::Properties)),
    ],
};

/// Properties carried by an event.
pub static EVENT_PROPERTY: Schema = Schema {
    required: &[
        leaf("name", Check::AsciiString),
        leaf("summary", Check::String),
        leaf("type", Check::DataType),
    ],
    optional: &[
        leaf("optional", Check::Boolean),
        leaf("platforms", Check::Platforms),
        object("deprecated", &DEPRECATED),
        leaf("since", Check::Since),
        leaf("exclude-platforms", Check::Platforms),
        leaf("constants", Check::Constants),
    ],
};

/// Events.
pub static EVENT: Schema = Schema {
    required: &[
        leaf("name", Check::LowercaseAsciiString),
        leaf("summary", Check::String),
    ],
    optional: &[
        leaf("description", Check::Markdown),
        leaf("platforms", Check::Platforms),
        leaf("since", Check::Since),
        object("deprecated", &DEPRECATED),
        leaf("osver", Check::OsVersions),
        list("properties", &EVENT_PROPERTY),
        leaf("exclude-platforms", Check::Platforms),
        leaf("notes", Check::Invalid),
    ],
};

/// Method parameters.
pub static PARAMETER: Schema = Schema {
    required: &[
        leaf("name", Check::AsciiString),
        leaf("summary", Check::String),
        leaf("type", Check::DataType),
    ],
    optional: &[
        leaf("optional", Check::Boolean),
        leaf("default", Check::Default),
        leaf("repeatable", Check::Boolean),
        leaf("constants", Check::Constants),
        leaf("notes", Check::Invalid),
    ],
};

/// Methods.
pub static METHOD: Schema = Schema {
    required: &[leaf("name", Check::AsciiString), leaf("summary", Check::String)],
    optional: &[
        leaf("description", Check::Markdown),
        leaf("returns", Check::Returns),
        leaf("platforms", Check::Platforms),
        leaf("since", Check::Since),
        object("deprecated", &DEPRECATED),
        list("examples", &EXAMPLE),
        leaf("osver", Check::OsVersions),
        list("parameters", &PARAMETER),
        leaf("exclude-platforms", Check::Platforms),
        leaf("notes", Check::Invalid),
    ],
};

/// Properties.
pub static PROPERTY: Schema = Schema {
    required: &[
        leaf("name", Check::AsciiString),
        leaf("summary", Check::String),
        leaf("type", Check::DataType),
    ],
    optional: &[
        leaf("description", Check::Markdown),
        leaf("platforms", Check::Platforms),
        leaf("since", Check::Since),
        object("deprecated", &DEPRECATED),
        leaf("osver", Check::OsVersions),
        list("examples", &EXAMPLE),
        leaf("permission", Check::Permission),
        leaf("availability", Check::Availability),
        leaf("accessors", Check::Boolean),
        leaf("optional", Check::Boolean),
        leaf("value", Check::Primitive),
        leaf("default", Check::Default),
        leaf("exclude-platforms", Check::Platforms),
        leaf("constants", Check::Constants),
        leaf("notes", Check::Invalid),
    ],
};

/// A whole type document.
pub static TYPE: Schema = Schema {
    required: &[leaf("name", Check::AsciiString), leaf("summary", Check::String)],
    optional: &[
        leaf("description", Check::Markdown),
        leaf("createable", Check::Boolean),
        leaf("platforms", Check::Platforms),
        leaf("exclude-platforms", Check::Platforms),
        object("excludes", &EXCLUDES),
        list("examples", &EXAMPLE),
        leaf("osver", Check::OsVersions),
        leaf("extends", Check::Class),
        object("deprecated", &DEPRECATED),
        leaf("since", Check::Since),
        list("events", &EVENT),
        list("methods", &METHOD),
        list("properties", &PROPERTY),
    ],
};
