//! Registration macros.
//!
//! [`handler_def!`](crate::handler_def) declares a definition static for a
//! handler type and submits it to the kind's inventory collection, so
//! [`Registries::collected`](crate::Registries::collected) finds it
//! wherever the crate ends up linked. The `register_*` wrappers cover the
//! common cases with less ceremony.

/// Declares a [`HandlerDef`](crate::HandlerDef) static for a handler type
/// and submits it to the given inventory collection.
///
/// The handler type must implement `Default`; construction goes through
/// it. Every field is spelled out here; the `register_*` wrappers supply
/// the usual defaults.
#[macro_export]
macro_rules! handler_def {
	(
		kind: $kind:ty,
		reg: $reg:path,
		handler: $handler:ident,
		id: $id:expr,
		priority: $priority:expr,
		constraints: $constraints:expr,
		can_handle: $can_handle:expr $(,)?
	) => {
		$crate::__private::paste! {
			static [<$handler:snake:upper _DEF>]: $crate::HandlerDef<$kind> = $crate::HandlerDef {
				id: $id,
				handler_type: $crate::TypeKey::of::<$handler>,
				priority: $priority,
				constraints: $constraints,
				can_handle: $can_handle,
				construct: || ::std::boxed::Box::new(<$handler as ::std::default::Default>::default()),
			};

			$crate::__private::inventory::submit! {
				$reg(&[<$handler:snake:upper _DEF>])
			}
		}
	};
}

/// Registers an immediate-mode drawer. Omitted priority defers to the
/// genus fallback, an omitted capability check accepts everything.
#[macro_export]
macro_rules! register_drawer {
	($handler:ident { id: $id:expr, constraints: $constraints:expr $(,)? }) => {
		$crate::register_drawer!($handler {
			id: $id,
			constraints: $constraints,
			priority: ::std::option::Option::None,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr $(,)? }) => {
		$crate::register_drawer!($handler {
			id: $id,
			constraints: $constraints,
			priority: $priority,
			can_handle: |_| true,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr, can_handle: $can_handle:expr $(,)? }) => {
		$crate::handler_def! {
			kind: $crate::DrawerKind,
			reg: $crate::DrawerReg,
			handler: $handler,
			id: $id,
			priority: $priority,
			constraints: $constraints,
			can_handle: $can_handle,
		}
	};
}

/// Registers a post-processor.
#[macro_export]
macro_rules! register_post_processor {
	($handler:ident { id: $id:expr, constraints: $constraints:expr $(,)? }) => {
		$crate::register_post_processor!($handler {
			id: $id,
			constraints: $constraints,
			priority: ::std::option::Option::None,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr $(,)? }) => {
		$crate::register_post_processor!($handler {
			id: $id,
			constraints: $constraints,
			priority: $priority,
			can_handle: |_| true,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr, can_handle: $can_handle:expr $(,)? }) => {
		$crate::handler_def! {
			kind: $crate::PostProcessorKind,
			reg: $crate::PostProcessorReg,
			handler: $handler,
			id: $id,
			priority: $priority,
			constraints: $constraints,
			can_handle: $can_handle,
		}
	};
}

/// Registers a retained-mode visual builder.
#[macro_export]
macro_rules! register_visual_builder {
	($handler:ident { id: $id:expr, constraints: $constraints:expr $(,)? }) => {
		$crate::register_visual_builder!($handler {
			id: $id,
			constraints: $constraints,
			priority: ::std::option::Option::None,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr $(,)? }) => {
		$crate::register_visual_builder!($handler {
			id: $id,
			constraints: $constraints,
			priority: $priority,
			can_handle: |_| true,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr, can_handle: $can_handle:expr $(,)? }) => {
		$crate::handler_def! {
			kind: $crate::VisualBuilderKind,
			reg: $crate::VisualBuilderReg,
			handler: $handler,
			id: $id,
			priority: $priority,
			constraints: $constraints,
			can_handle: $can_handle,
		}
	};
}

/// Registers a retained-mode visual processor.
#[macro_export]
macro_rules! register_visual_processor {
	($handler:ident { id: $id:expr, constraints: $constraints:expr $(,)? }) => {
		$crate::register_visual_processor!($handler {
			id: $id,
			constraints: $constraints,
			priority: ::std::option::Option::None,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr $(,)? }) => {
		$crate::register_visual_processor!($handler {
			id: $id,
			constraints: $constraints,
			priority: $priority,
			can_handle: |_| true,
		});
	};
	($handler:ident { id: $id:expr, constraints: $constraints:expr, priority: $priority:expr, can_handle: $can_handle:expr $(,)? }) => {
		$crate::handler_def! {
			kind: $crate::VisualProcessorKind,
			reg: $crate::VisualProcessorReg,
			handler: $handler,
			id: $id,
			priority: $priority,
			constraints: $constraints,
			can_handle: $can_handle,
		}
	};
}
