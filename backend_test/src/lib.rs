use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one running against a
/// fresh server over in-memory stores, and inject dependencies.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// `crate::model::store::Stores`, the same stores the server uses.
///
/// `#[backend_test(admin)]` and `#[backend_test(voter)]` insert the example
/// admin or voter and log the client in as them before the test starts.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin/voter if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        None => quote! {},
        Some(arg) => {
            let (user, login) = if arg == "admin" {
                (
                    quote! { crate::model::db::NewUser::example_admin() },
                    quote! { crate::model::api::user::LoginRequest::example_admin() },
                )
            } else if arg == "voter" {
                (
                    quote! { crate::model::db::NewUser::example_voter() },
                    quote! {
                        crate::model::api::user::LoginRequest::example_voter(
                            crate::model::db::examples::VOTER_NATIONAL_ID,
                        )
                    },
                )
            } else {
                return syn::Error::new(arg.span(), "Expected `admin` or `voter`")
                    .into_compile_error()
                    .into();
            };

            quote! {
                stores.users.insert_user(#user).await.unwrap();

                let response = rocket_client
                    .post("/login")
                    .header(rocket::http::ContentType::JSON)
                    .body(rocket::serde::json::json!(#login).to_string())
                    .dispatch()
                    .await;
                assert_eq!(rocket::http::Status::Ok, response.status(), "test login failed");
                drop(response);
            }
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            log4rs_test_utils::test_logging::init_logging_once_for(
                ["voting_backend"],
                None,
                None,
            );

            /// Test setup.
            async fn setup() -> (rocket::local::asynchronous::Client, crate::model::store::Stores) {
                let stores = crate::model::store::Stores::in_memory();
                let rocket = crate::rocket_for_stores(crate::config::Config::example(), stores.clone());
                let rocket_client = rocket::local::asynchronous::Client::tracked(rocket)
                    .await
                    .unwrap();

                #maybe_login

                (rocket_client, stores)
            }

            /// The test itself.
            #item_fn

            rocket::async_test(async {
                #[allow(unused_variables)]
                let (rocket_client, stores) = setup().await;
                #new_name(#(#test_args),*).await;
            })
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_stores = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                // Valid as the last path segment for any type is itself
                let type_ident = &type_path.path.segments.last().unwrap().ident;
                if type_ident == "Client" {
                    if has_client {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    has_client = true;
                    args.push(quote! { rocket_client });
                    continue;
                } else if type_ident == "Stores" {
                    if has_stores {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `Stores`",
                        ));
                    }
                    has_stores = true;
                    args.push(quote! { stores });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `stores_ident: Stores`",
        ));
    }

    Ok(args)
}
