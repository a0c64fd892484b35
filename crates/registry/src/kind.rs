/// Marker for one handler capability family.
///
/// A kind ties a registry to the object-safe instance type its definitions
/// construct. Kinds are zero-sized markers; one registry exists per kind.
pub trait HandlerKind: Sized + 'static {
	/// What [`crate::HandlerDef::construct`] produces, usually a trait
	/// object.
	type Instance: ?Sized + 'static;

	/// Capability label for logs and diagnostics.
	const LABEL: &'static str;
}
