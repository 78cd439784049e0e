use crate::error::InvocationError;

/// Ships a serialized request body to a model and returns the raw response body.
pub trait ModelInvoker {
    fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvocationError>;
}

impl<T: ModelInvoker + ?Sized> ModelInvoker for &T {
    fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        (**self).invoke_model(model_id, body)
    }
}

impl<T: ModelInvoker + ?Sized> ModelInvoker for Box<T> {
    fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        (**self).invoke_model(model_id, body)
    }
}
