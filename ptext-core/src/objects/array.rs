use crate::objects::Object;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    elements: Vec<Object>,
}

impl Array {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, object: impl Into<Object>) {
        self.elements.push(object.into());
    }

    pub fn pop(&mut self) -> Option<Object> {
        self.elements.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Object> {
        self.elements.get_mut(index)
    }

    pub fn first(&self) -> Option<&Object> {
        self.elements.first()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[Object] {
        &self.elements
    }
}

impl From<Vec<Object>> for Array {
    fn from(elements: Vec<Object>) -> Self {
        Self { elements }
    }
}

impl From<Array> for Vec<Object> {
    fn from(array: Array) -> Self {
        array.elements
    }
}

impl FromIterator<Object> for Array {
    fn from_iter<T: IntoIterator<Item = Object>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut array = Array::new();
        array.push(1);
        array.push(Object::name("Two"));
        array.push("three");

        assert_eq!(array.len(), 3);
        assert_eq!(array.get(0), Some(&Object::from(1)));
        assert_eq!(array.get(1), Some(&Object::name("Two")));
        assert_eq!(array.get(3), None);
        assert_eq!(array.first(), Some(&Object::from(1)));
    }

    #[test]
    fn test_collect_and_iterate() {
        let array: Array = (0..4).map(Object::from).collect();
        let total: i64 = array.iter().filter_map(Object::as_integer).sum();
        assert_eq!(total, 6);

        let back: Vec<Object> = array.into();
        assert_eq!(back.len(), 4);
    }
}
