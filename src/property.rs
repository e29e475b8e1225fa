use std::{
    cell::{Ref, RefCell, RefMut},
    marker::PhantomData,
    ops::{Deref, DerefMut, Index, IndexMut},
    rc::{Rc, Weak},
};

use crate::{
    element::{EH, FH, HH, Handle, VH},
    error::Error,
};

/// Marker for types that can be stored in properties.
pub trait TPropData: Clone + Copy + 'static {}

impl TPropData for bool {}
impl TPropData for u8 {}
impl TPropData for u16 {}
impl TPropData for u32 {}
impl TPropData for usize {}
impl TPropData for f64 {}
impl TPropData for glam::DVec3 {}
impl<T: TPropData> TPropData for Option<T> {}
impl TPropData for VH {}
impl TPropData for HH {}
impl TPropData for EH {}
impl TPropData for FH {}
impl<T: TPropData, const N: usize> TPropData for [T; N] {}

/// Keeps all properties registered against one element type in sync with the
/// element arena. Holds weak references, so dropping a property simply
/// unregisters it.
pub(crate) struct PropertyContainer<H>
where
    H: Handle,
{
    props: Vec<Box<dyn GenericProperty>>,
    length: usize,
    _phantom: PhantomData<H>,
}

impl<H> Default for PropertyContainer<H>
where
    H: Handle,
{
    fn default() -> Self {
        PropertyContainer {
            props: Vec::new(),
            length: 0,
            _phantom: PhantomData,
        }
    }
}

impl<H> PropertyContainer<H>
where
    H: Handle,
{
    fn register(&mut self, prop: Box<dyn GenericProperty>) {
        self.props.push(prop);
    }

    /// Reserve memory to accomodate an additional `n` elements.
    pub fn reserve(&mut self, n: usize) -> Result<(), Error> {
        for prop in self.props.iter_mut() {
            prop.reserve(n)?;
        }
        Ok(())
    }

    pub fn push_value(&mut self) -> Result<(), Error> {
        let (count, err) = self
            .props
            .iter_mut()
            .fold((0usize, Ok(())), |(count, err), prop| match err {
                Ok(()) => match prop.push(1) {
                    Ok(()) => (count + 1, Ok(())),
                    Err(e) => (count, Err(e)),
                },
                Err(e) => (count, Err(e)),
            });
        // If something went wrong, go back to how things were.
        if err.is_err() {
            for prop in self.props.iter_mut().take(count) {
                prop.resize(self.length)?;
            }
            return err;
        }
        self.length += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.length
    }

    /// Drop registrations whose owning property no longer exists.
    pub fn prune(&mut self) {
        self.props.retain(|prop| prop.is_alive())
    }
}

trait GenericProperty {
    fn reserve(&mut self, n: usize) -> Result<(), Error>;

    fn resize(&mut self, n: usize) -> Result<(), Error>;

    fn push(&mut self, num: usize) -> Result<(), Error>;

    fn is_alive(&self) -> bool;
}

/// Buffer containing the property values.
///
/// A thin wrapper around a `Vec<T>` that allows type safe indexing with the
/// handle type `H`, and dereferences to a slice when raw access is wanted.
pub struct PropBuf<H, T>
where
    H: Handle,
    T: TPropData,
{
    buf: Vec<T>,
    _phantom: PhantomData<H>,
}

impl<H, T> Index<H> for PropBuf<H, T>
where
    H: Handle,
    T: TPropData,
{
    type Output = T;

    fn index(&self, handle: H) -> &Self::Output {
        &self.buf[handle.index() as usize]
    }
}

impl<H, T> IndexMut<H> for PropBuf<H, T>
where
    H: Handle,
    T: TPropData,
{
    fn index_mut(&mut self, h: H) -> &mut Self::Output {
        &mut self.buf[h.index() as usize]
    }
}

impl<H, T> Deref for PropBuf<H, T>
where
    H: Handle,
    T: TPropData,
{
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<H, T> DerefMut for PropBuf<H, T>
where
    H: Handle,
    T: TPropData,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

/// A value of type `T` associated with every element of handle type `H`.
///
/// Unlike a plain `Vec<T>`, a property registered with a mesh stays
/// synchronized as elements are added: new elements receive the default value.
/// Borrowing follows interior mutability rules enforced at runtime.
#[derive(Clone)]
pub struct Property<H, T>
where
    H: Handle,
    T: TPropData,
{
    data: Rc<RefCell<PropBuf<H, T>>>,
    default: T,
}

impl<H, T> Property<H, T>
where
    H: Handle + 'static,
    T: TPropData,
{
    pub(crate) fn new(container: &mut PropertyContainer<H>, default: T) -> Self {
        let prop = Property {
            data: Rc::new(RefCell::new(PropBuf {
                buf: vec![default; container.len()],
                _phantom: PhantomData,
            })),
            default,
        };
        container.register(Box::new(WeakProperty {
            data: Rc::downgrade(&prop.data),
            default,
        }));
        prop
    }

    /// Try to borrow the property with read-only access.
    ///
    /// Returns [`Error::BorrowedPropertyAccess`] if the buffer is already
    /// mutably borrowed.
    pub fn try_borrow(&self) -> Result<Ref<'_, PropBuf<H, T>>, Error> {
        self.data
            .try_borrow()
            .map_err(|_| Error::BorrowedPropertyAccess)
    }

    /// Try to borrow the property with mutable access.
    pub fn try_borrow_mut(&mut self) -> Result<RefMut<'_, PropBuf<H, T>>, Error> {
        self.data
            .try_borrow_mut()
            .map_err(|_| Error::BorrowedPropertyAccess)
    }

    /// Get the cloned property value of the mesh element `h`.
    pub fn get_cloned(&self, h: H) -> Result<T, Error> {
        let buf = self.try_borrow()?;
        Ok(buf[h])
    }

    /// Get a mutable reference to the property value of a mesh element.
    pub fn get_mut(&mut self, h: H) -> Result<RefMut<'_, T>, Error> {
        Ok(RefMut::map(
            self.data
                .try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?,
            |v| &mut v.buf[h.index() as usize],
        ))
    }

    /// Set the property value of a mesh element.
    pub fn set(&mut self, h: H, val: T) -> Result<(), Error> {
        (*self.get_mut(h)?) = val;
        Ok(())
    }

    /// Reset every element to the default value.
    pub fn fill(&mut self, val: T) -> Result<(), Error> {
        let mut buf = self.try_borrow_mut()?;
        buf.buf.fill(val);
        Ok(())
    }
}

/// Vertex property. A value of type `T` is defined on each vertex of the mesh.
pub type VProperty<T> = Property<VH, T>;

/// Halfedge property. A value of type `T` is defined on each halfedge of the mesh.
pub type HProperty<T> = Property<HH, T>;

/// Edge property. A value of type `T` is defined on each edge of the mesh.
pub type EProperty<T> = Property<EH, T>;

/// Face property. A value of type `T` is defined on each face of the mesh.
pub type FProperty<T> = Property<FH, T>;

/// Buffer containing the values of a vertex property.
pub type VPropBuf<T> = PropBuf<VH, T>;

/// Buffer containing the values of an edge property.
pub type EPropBuf<T> = PropBuf<EH, T>;

/// Buffer containing the values of a face property.
pub type FPropBuf<T> = PropBuf<FH, T>;

/// What lives inside the property container. It does not control the lifetime
/// of the property, but grows the buffer whenever elements are added to the
/// mesh.
struct WeakProperty<H, T>
where
    H: Handle,
    T: TPropData,
{
    data: Weak<RefCell<PropBuf<H, T>>>,
    default: T,
}

impl<H, T> GenericProperty for WeakProperty<H, T>
where
    H: Handle,
    T: TPropData,
{
    fn reserve(&mut self, n: usize) -> Result<(), Error> {
        if let Some(prop) = self.data.upgrade() {
            prop.try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?
                .buf
                .reserve(n);
        }
        Ok(())
    }

    fn resize(&mut self, n: usize) -> Result<(), Error> {
        if let Some(prop) = self.data.upgrade() {
            prop.try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?
                .buf
                .resize(n, self.default);
        }
        Ok(())
    }

    fn push(&mut self, num: usize) -> Result<(), Error> {
        if let Some(prop) = self.data.upgrade() {
            let mut prop = prop
                .try_borrow_mut()
                .map_err(|_| Error::BorrowedPropertyAccess)?;
            let buf: &mut Vec<T> = &mut prop.buf;
            buf.resize(buf.len() + num, self.default);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.data.upgrade().is_some()
    }
}
