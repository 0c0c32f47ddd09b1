//! Modifier flags for classes and class members.

use bitflags::bitflags;

bitflags! {
    /// Modifiers attached to a class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u16 {
        const PUBLIC    = 1 << 0;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC    = 1 << 3;
        const FINAL     = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const INTERFACE = 1 << 6;
        const ENUM      = 1 << 7;
        const ANNOTATION = 1 << 8;
    }
}

impl ClassFlags {
    /// Whether the class is declared `static`.
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(ClassFlags::STATIC)
    }

    /// Whether the class is abstract (or an interface, which is implicitly abstract).
    #[inline]
    pub fn is_abstract(self) -> bool {
        self.intersects(ClassFlags::ABSTRACT | ClassFlags::INTERFACE)
    }

    /// Whether the class is an interface.
    #[inline]
    pub fn is_interface(self) -> bool {
        self.contains(ClassFlags::INTERFACE)
    }
}

bitflags! {
    /// Modifiers attached to a field, property, or method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u16 {
        const PUBLIC    = 1 << 0;
        const PRIVATE   = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC    = 1 << 3;
        const FINAL     = 1 << 4;
        const ABSTRACT  = 1 << 5;
        const SYNTHETIC = 1 << 6;
    }
}

impl MemberFlags {
    /// Whether the member is declared `static`.
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(MemberFlags::STATIC)
    }

    /// Whether the member is `private`.
    #[inline]
    pub fn is_private(self) -> bool {
        self.contains(MemberFlags::PRIVATE)
    }

    /// Whether the member is `public`.
    #[inline]
    pub fn is_public(self) -> bool {
        self.contains(MemberFlags::PUBLIC)
    }

    /// Whether the member is `protected`.
    #[inline]
    pub fn is_protected(self) -> bool {
        self.contains(MemberFlags::PROTECTED)
    }
}
