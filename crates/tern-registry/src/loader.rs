//! Class loading: descriptors for already-compiled classes and the
//! [`ClassLoader`] seam through which the resolver reaches them.
//!
//! A [`LoadedClass`] is the summary of a compiled class that resolution
//! needs: its modifiers, its superclass name, and a member table with just
//! enough signature information to answer "could this call bind" questions.

use rustc_hash::FxHashMap;
use tern_core::{ClassFlags, ConstantValue, MemberFlags, names};

/// The signature summary of one method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSig {
    pub name: String,
    pub flags: MemberFlags,
    /// Fewest arguments a call may pass (trailing defaults reduce this).
    pub min_args: usize,
    /// Most arguments a call may pass; `None` for varargs.
    pub max_args: Option<usize>,
    /// Whether the return type is boolean, for `is`-accessor checks.
    pub returns_boolean: bool,
}

impl MethodSig {
    /// Whether a call with `argc` arguments could bind to this signature.
    /// `None` means the argument count is unknown and anything matches.
    pub fn accepts(&self, argc: Option<usize>) -> bool {
        match argc {
            None => true,
            Some(n) => n >= self.min_args && self.max_args.is_none_or(|max| n <= max),
        }
    }
}

/// The summary of one field or property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSig {
    pub name: String,
    pub flags: MemberFlags,
    /// Whether accessor methods are generated for this member.
    pub is_property: bool,
    /// The literal value of a static final field, when known.
    pub constant: Option<ConstantValue>,
}

/// Member signatures of one class, queried during import rewriting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberTable {
    pub methods: Vec<MethodSig>,
    pub fields: Vec<FieldSig>,
}

impl MemberTable {
    /// Whether any method named `name` accepting `argc` arguments exists.
    pub fn has_possible_method(&self, name: &str, argc: Option<usize>) -> bool {
        self.methods
            .iter()
            .any(|m| m.name == name && m.accepts(argc))
    }

    /// Whether a static method named `name` accepting `argc` arguments exists.
    pub fn has_possible_static_method(&self, name: &str, argc: Option<usize>) -> bool {
        self.methods
            .iter()
            .any(|m| m.name == name && m.flags.is_static() && m.accepts(argc))
    }

    /// Whether an instance (non-static) method named `name` exists.
    pub fn has_instance_method(&self, name: &str) -> bool {
        self.methods
            .iter()
            .any(|m| m.name == name && !m.flags.is_static())
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a static property named `name` exists, either declared as a
    /// property or implied by a static zero-argument accessor.
    pub fn has_static_property(&self, name: &str) -> bool {
        if self
            .fields
            .iter()
            .any(|f| f.name == name && f.is_property && f.flags.is_static())
        {
            return true;
        }
        let getter = names::getter_name(name);
        let boolean_getter = names::boolean_getter_name(name);
        self.methods.iter().any(|m| {
            m.flags.is_static()
                && m.accepts(Some(0))
                && (m.name == getter || (m.name == boolean_getter && m.returns_boolean))
        })
    }
}

/// The resolution-time view of a compiled class.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedClass {
    /// Fully qualified name (`$` separates nested classes).
    pub name: String,
    pub flags: ClassFlags,
    /// Superclass name; `None` only for the root of the hierarchy.
    pub superclass: Option<String>,
    pub members: MemberTable,
    /// When the class was built, for source staleness checks.
    pub timestamp: u64,
}

impl LoadedClass {
    /// A public class extending `java.lang.Object`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let superclass = if name == "java.lang.Object" {
            None
        } else {
            Some("java.lang.Object".to_string())
        };
        Self {
            name,
            flags: ClassFlags::PUBLIC,
            superclass,
            members: MemberTable::default(),
            timestamp: 0,
        }
    }

    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn built_at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a static method taking exactly `argc` arguments.
    pub fn static_method(mut self, name: impl Into<String>, argc: usize) -> Self {
        self.members.methods.push(MethodSig {
            name: name.into(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
            min_args: argc,
            max_args: Some(argc),
            returns_boolean: false,
        });
        self
    }

    /// Add an instance method taking exactly `argc` arguments.
    pub fn instance_method(mut self, name: impl Into<String>, argc: usize) -> Self {
        self.members.methods.push(MethodSig {
            name: name.into(),
            flags: MemberFlags::PUBLIC,
            min_args: argc,
            max_args: Some(argc),
            returns_boolean: false,
        });
        self
    }

    /// Add a public static field.
    pub fn static_field(mut self, name: impl Into<String>) -> Self {
        self.members.fields.push(FieldSig {
            name: name.into(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
            is_property: false,
            constant: None,
        });
        self
    }

    /// Add a public static final field with a known literal value.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<ConstantValue>) -> Self {
        self.members.fields.push(FieldSig {
            name: name.into(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC | MemberFlags::FINAL,
            is_property: false,
            constant: Some(value.into()),
        });
        self
    }

    /// Add a static property.
    pub fn static_property(mut self, name: impl Into<String>) -> Self {
        self.members.fields.push(FieldSig {
            name: name.into(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
            is_property: true,
            constant: None,
        });
        self
    }
}

/// A source file discovered for a class name that has not been compiled yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSource {
    /// The class the file would define.
    pub class_name: String,
    /// Where the file lives, for diagnostics.
    pub location: String,
    /// Source modification time, compared against class build timestamps.
    pub last_modified: u64,
}

/// The seam between resolution and the outside world.
///
/// Lookup asks for compiled classes and for source files by class name;
/// everything else (caching, staleness, interning) happens on the resolver
/// side of the seam.
pub trait ClassLoader {
    /// Load the descriptor of an already-compiled class.
    fn load_class(&self, name: &str) -> Option<LoadedClass>;

    /// Find a source file that would define `name`.
    fn find_script(&self, name: &str) -> Option<ScriptSource>;
}

/// An in-memory [`ClassLoader`] backed by hash maps.
#[derive(Debug, Clone, Default)]
pub struct MapClassLoader {
    classes: FxHashMap<String, LoadedClass>,
    scripts: FxHashMap<String, ScriptSource>,
}

impl MapClassLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader pre-populated with the core library classes the default
    /// import packages refer to.
    pub fn with_core_types() -> Self {
        let mut loader = Self::new();
        loader.add_class(LoadedClass::new("java.lang.Object"));
        loader.add_class(LoadedClass::new("java.lang.String"));
        loader.add_class(LoadedClass::new("java.lang.Boolean"));
        loader.add_class(LoadedClass::new("java.lang.Integer").constant("MAX_VALUE", i64::from(i32::MAX)));
        loader.add_class(LoadedClass::new("java.lang.Number"));
        loader.add_class(LoadedClass::new("java.lang.Exception"));
        loader.add_class(LoadedClass::new("java.lang.RuntimeException").extending("java.lang.Exception"));
        loader.add_class(
            LoadedClass::new("java.lang.Math")
                .with_flags(ClassFlags::PUBLIC | ClassFlags::FINAL)
                .static_method("max", 2)
                .static_method("min", 2)
                .static_method("abs", 1)
                .constant("PI", std::f64::consts::PI),
        );
        loader.add_class(LoadedClass::new("java.lang.System").static_field("out"));
        loader.add_class(
            LoadedClass::new("java.util.List").with_flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE),
        );
        loader.add_class(LoadedClass::new("java.util.ArrayList"));
        loader.add_class(
            LoadedClass::new("java.util.Map").with_flags(ClassFlags::PUBLIC | ClassFlags::INTERFACE),
        );
        loader.add_class(LoadedClass::new("java.util.HashMap"));
        loader.add_class(LoadedClass::new("java.util.Collections"));
        loader.add_class(LoadedClass::new("java.io.File"));
        loader.add_class(LoadedClass::new("java.net.URL"));
        loader.add_class(LoadedClass::new("java.math.BigInteger").extending("java.lang.Number"));
        loader.add_class(LoadedClass::new("java.math.BigDecimal").extending("java.lang.Number"));
        loader
    }

    /// Register a compiled class.
    pub fn add_class(&mut self, class: LoadedClass) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Register a source file for a class name.
    pub fn add_script(&mut self, script: ScriptSource) {
        self.scripts.insert(script.class_name.clone(), script);
    }
}

impl ClassLoader for MapClassLoader {
    fn load_class(&self, name: &str) -> Option<LoadedClass> {
        self.classes.get(name).cloned()
    }

    fn find_script(&self, name: &str) -> Option<ScriptSource> {
        self.scripts.get(name).cloned()
    }
}
