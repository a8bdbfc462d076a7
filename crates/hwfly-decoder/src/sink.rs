//! Annotation output

use hwfly_protocol::Annotation;

/// Receiver for finished annotations
///
/// Hosts implement this to forward annotations into their own output
/// channel. Annotations arrive in the order they were produced, which is
/// capture order except that a merged poll run is delivered once the run
/// ends.
pub trait AnnotationSink {
    /// Accept one annotation
    fn put(&mut self, annotation: Annotation);
}

impl AnnotationSink for Vec<Annotation> {
    fn put(&mut self, annotation: Annotation) {
        self.push(annotation);
    }
}

impl<S: AnnotationSink + ?Sized> AnnotationSink for &mut S {
    fn put(&mut self, annotation: Annotation) {
        (**self).put(annotation);
    }
}

impl<S: AnnotationSink + ?Sized> AnnotationSink for Box<S> {
    fn put(&mut self, annotation: Annotation) {
        (**self).put(annotation);
    }
}
