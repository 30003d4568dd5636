//! `#[managed]` attribute extraction for automatically lifecycle-managed
//! handler parameters (e.g. `Tx<DB>`).

use crate::types::ManagedParam;

/// Detect `#[managed]` on handler parameters. Strips the attribute and
/// unwraps the declared `&mut T` type down to `T`.
pub fn extract_managed_params(method: &mut syn::ImplItemFn) -> syn::Result<Vec<ManagedParam>> {
    let mut managed_params = Vec::new();
    let mut param_idx = 0usize;

    for arg in method.sig.inputs.iter_mut() {
        if let syn::FnArg::Typed(pat_type) = arg {
            let is_managed = pat_type.attrs.iter().any(|a| a.path().is_ident("managed"));

            if is_managed {
                let ty = match &*pat_type.ty {
                    syn::Type::Reference(type_ref) if type_ref.mutability.is_some() => {
                        (*type_ref.elem).clone()
                    }
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "#[managed] parameters must be declared as `&mut T`\n\n\
                             hint: #[managed] tx: &mut Tx<Sqlite>",
                        ));
                    }
                };
                managed_params.push(ManagedParam {
                    index: param_idx,
                    ty,
                });
                pat_type.attrs.retain(|a| !a.path().is_ident("managed"));
            }
            param_idx += 1;
        }
    }

    Ok(managed_params)
}
