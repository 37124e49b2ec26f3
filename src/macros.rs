/// Builds a `Value` from a JSON-like literal. Map keys are any expressions convertible into
/// `String`, leaf values are any expressions convertible into `Value`.
#[macro_export]
macro_rules! value {
    ({ $($tt:tt)* }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::Map::new();
        $crate::value!(@map map () $($tt)*);
        $crate::value::Value::Map(map)
    }};
    ([ $($tt:tt)* ]) => {{
        #[allow(unused_mut)]
        let mut list = $crate::value::List::new();
        $crate::value!(@list list () $($tt)*);
        $crate::value::Value::List(list)
    }};

    // Map: collect key tokens up to `=>`, then value tokens up to `,`.
    (@map $map:ident ()) => {};
    (@map $map:ident ($($key:tt)+) => $($rest:tt)*) => {
        $crate::value!(@entry $map ($($key)+) () $($rest)*);
    };
    (@map $map:ident ($($key:tt)*) $next:tt $($rest:tt)*) => {
        $crate::value!(@map $map ($($key)* $next) $($rest)*);
    };
    (@entry $map:ident ($($key:tt)+) ($($val:tt)+)) => {
        $map.insert(($($key)+).into(), $crate::value!($($val)+));
    };
    (@entry $map:ident ($($key:tt)+) ($($val:tt)+) , $($rest:tt)*) => {
        $map.insert(($($key)+).into(), $crate::value!($($val)+));
        $crate::value!(@map $map () $($rest)*);
    };
    (@entry $map:ident ($($key:tt)+) ($($val:tt)*) $next:tt $($rest:tt)*) => {
        $crate::value!(@entry $map ($($key)+) ($($val)* $next) $($rest)*);
    };

    // List: collect item tokens up to `,`.
    (@list $list:ident ()) => {};
    (@list $list:ident ($($item:tt)+)) => {
        $list.push($crate::value!($($item)+));
    };
    (@list $list:ident ($($item:tt)+) , $($rest:tt)*) => {
        $list.push($crate::value!($($item)+));
        $crate::value!(@list $list () $($rest)*);
    };
    (@list $list:ident ($($item:tt)*) $next:tt $($rest:tt)*) => {
        $crate::value!(@list $list ($($item)* $next) $($rest)*);
    };

    ($val:expr) => {
        $crate::value::Value::from($val)
    };
}
