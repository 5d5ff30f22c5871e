/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// Every argument becomes a field of the request variant, plus `respond_to`.
/// Arguments are not recorded on the span since they can carry secrets.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[tracing::instrument(skip_all, fields(actor = %self.address))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $crate::error::IdentityError> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| {
                        $crate::error::IdentityError::ActorCommunication(format!("Actor {} closed", self.address))
                    })?;

                response.await.map_err(|_| {
                    $crate::error::IdentityError::ActorCommunication(format!("Actor {} dropped the request", self.address))
                })?
            }
        }
    };
}

/// Generate the constructor and address accessor shared by all clients.
macro_rules! impl_client_new {
    ($client:ident, $request:ty) => {
        impl $client {
            pub fn new(address: $crate::keys::ActorAddress, sender: tokio::sync::mpsc::Sender<$request>) -> Self {
                Self { address, sender }
            }

            pub fn address(&self) -> &$crate::keys::ActorAddress {
                &self.address
            }
        }
    };
}
