//! Total classification: every value maps to exactly one `kind`.

use crate::record::RecordKind;
use crate::value::ObjectKind;

#[must_use]
pub fn record_kind_of(object_kind: ObjectKind) -> Option<RecordKind> {
    Some(match object_kind {
        ObjectKind::PlainObject | ObjectKind::UnknownNative => RecordKind::PlainObject,
        ObjectKind::Array => RecordKind::Array,
        ObjectKind::Function => RecordKind::Function,
        ObjectKind::Class => RecordKind::Class,
        ObjectKind::Regex => RecordKind::Regex,
        ObjectKind::Date => RecordKind::Date,
        ObjectKind::Map | ObjectKind::Set => RecordKind::MapOrSet,
        ObjectKind::TypedBuffer => RecordKind::TypedBuffer,
        ObjectKind::BoxedPrimitive => RecordKind::BoxedPrimitive,
        ObjectKind::Promise => RecordKind::Promise,
        ObjectKind::Global => RecordKind::Global,
        ObjectKind::BuiltinModule => RecordKind::BuiltinModule,
        ObjectKind::ImportProxy => RecordKind::ImportProxy,
        // No reconstructible form; the tracer raises `UnreconstructibleValue`
        // instead of calling this function for `Host`.
        ObjectKind::Host => return None,
    })
}
