/// User-facing side channel of the controller.
///
/// The presentation layer implements this: `alert` shows a blocking message,
/// `confirm` asks a yes/no question.
pub trait Prompt: Send + Sync {
    fn alert(&self, message: &str);

    fn confirm(&self, question: &str) -> bool;
}

impl<P: Prompt + ?Sized> Prompt for std::sync::Arc<P> {
    fn alert(&self, message: &str) {
        (**self).alert(message);
    }

    fn confirm(&self, question: &str) -> bool {
        (**self).confirm(question)
    }
}
