//! The post form.

use async_trait::async_trait;
use blog_forms::fields::{FormFieldDef, FormFieldType};
use blog_forms::form::{BaseForm, Form};

/// An accepted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Stripped title.
    pub title: String,
    /// Body text, as submitted.
    pub content: String,
}

/// New-post form. Both fields are required; nothing else is checked.
#[derive(Debug)]
pub struct PostForm {
    inner: BaseForm,
}

impl PostForm {
    /// Creates an unbound post form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new(
                "post",
                vec![
                    FormFieldDef::new("title", FormFieldType::Text { strip: true }).label("Title"),
                    FormFieldDef::new("content", FormFieldType::TextArea { strip: false })
                        .label("Content"),
                ],
            ),
        }
    }

    /// Returns the accepted submission.
    pub fn post(&self) -> Option<NewPost> {
        self.inner.is_accepted().then(|| NewPost {
            title: self.inner.cleaned_str("title").unwrap_or_default().to_string(),
            content: self.inner.cleaned_str("content").unwrap_or_default().to_string(),
        })
    }
}

impl Default for PostForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for PostForm {
    type Context = ();

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_forms::FormData;

    #[tokio::test]
    async fn test_post_accepted() {
        let mut form = PostForm::new();
        form.bind(&FormData::parse("title=+Hello+&content=First+line%0ASecond"));
        assert!(form.is_valid(&()).await.unwrap());
        assert_eq!(
            form.post(),
            Some(NewPost {
                title: "Hello".to_string(),
                content: "First line\nSecond".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_post_requires_both_fields() {
        let mut form = PostForm::new();
        form.bind(&FormData::parse("title=&content=+++"));
        assert!(!form.is_valid(&()).await.unwrap());
        assert!(form.errors().contains_key("title"));
        assert!(form.errors().contains_key("content"));
        assert!(form.post().is_none());
    }

    #[tokio::test]
    async fn test_post_unbound_is_not_valid() {
        let mut form = PostForm::default();
        assert!(!form.is_valid(&()).await.unwrap());
        assert!(form.post().is_none());
    }
}
