use std::{cmp::min, fmt, mem};

use crate::error::{InsertError, MatchError};
use crate::params::Params;

/// The types of nodes a tree can hold.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum NodeType {
    /// A static prefix, e.g. `/foo`.
    Static,
    /// The root path.
    Root,
    /// A named parameter, e.g. `/:id`.
    Param,
    /// A catch-all parameter, e.g. `/*file`.
    CatchAll,
}

/// Counts the wildcard sigils `:` and `*` in a registration path,
/// saturating at the maximum storable count.
pub(crate) fn count_wildcards(path: &str) -> u8 {
    let n = path.bytes().filter(|&b| b == b':' || b == b'*').count();
    min(n, usize::from(u8::MAX)) as u8
}

/// A radix tree used for URL path matching.
///
/// See [the crate documentation](crate) for details.
#[derive(Clone)]
pub(crate) struct Node<T> {
    // This node's segment of the registration path.
    path: Vec<u8>,

    // Whether the single child of this node is a param or catch-all node.
    // Mutually exclusive with having multiple static children.
    wild_child: bool,

    // The type of this node.
    node_type: NodeType,

    // Upper bound on the wildcard count of any route below this node,
    // used to pre-size parameter storage during a lookup.
    max_params: u8,

    // The number of routes registered through this node. Only used to
    // order sibling probing, never for correctness.
    priority: u32,

    // The first byte of each static child, for fast linear search.
    // Parallel in length and order to `children`.
    indices: Vec<u8>,

    // The children of this node.
    children: Vec<Node<T>>,

    // The value stored at this node.
    value: Option<T>,

    // The full registration path, stored on nodes that hold values.
    full_path: Box<str>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node {
            path: Vec::new(),
            wild_child: false,
            node_type: NodeType::Static,
            max_params: 0,
            priority: 0,
            indices: Vec::new(),
            children: Vec::new(),
            value: None,
            full_path: Box::from(""),
        }
    }
}

impl<T> Node<T> {
    pub(crate) fn new() -> Self {
        Node::default()
    }

    // Insert a route into the tree.
    //
    // The tree may be left with a neutral split node or an inflated
    // priority counter when an error is returned; neither affects match
    // correctness, and registration errors are fatal to the embedding
    // application anyway.
    pub(crate) fn add_route(&mut self, route: &str, value: T) -> Result<(), InsertError> {
        let full_path = route;
        let mut path = route.as_bytes();
        let mut wildcards = count_wildcards(route);

        self.priority += 1;

        // Empty tree.
        if self.path.is_empty() && self.children.is_empty() {
            self.insert_child(wildcards, path, full_path, value)?;
            self.node_type = NodeType::Root;
            return Ok(());
        }

        let mut node = self;

        'walk: loop {
            if wildcards > node.max_params {
                node.max_params = wildcards;
            }

            // Find the longest common prefix. It contains no ':' or '*'
            // since an existing key cannot hold those bytes.
            let max = min(path.len(), node.path.len());
            let mut i = 0;
            while i < max && path[i] == node.path[i] {
                i += 1;
            }

            // This node has a longer prefix than we need; split it and move
            // the non-matching suffix into a child.
            if i < node.path.len() {
                let mut child = Node {
                    path: node.path[i..].to_vec(),
                    wild_child: node.wild_child,
                    node_type: NodeType::Static,
                    max_params: 0,
                    priority: node.priority - 1,
                    indices: mem::take(&mut node.indices),
                    children: mem::take(&mut node.children),
                    value: node.value.take(),
                    full_path: mem::take(&mut node.full_path),
                };

                for grandchild in &child.children {
                    if grandchild.max_params > child.max_params {
                        child.max_params = grandchild.max_params;
                    }
                }

                node.indices = vec![node.path[i]];
                node.children = vec![child];
                node.path.truncate(i);
                node.wild_child = false;
            }

            // The route ends at this node, make it a leaf.
            if i == path.len() {
                if node.value.is_some() {
                    return Err(InsertError::Conflict {
                        path: full_path.to_owned(),
                    });
                }

                node.value = Some(value);
                node.full_path = Box::from(full_path);
                return Ok(());
            }

            path = &path[i..];

            if node.wild_child {
                node = &mut node.children[0];
                node.priority += 1;

                if wildcards > node.max_params {
                    node.max_params = wildcards;
                }

                // Check if the wildcard matches, e.g. ':name' and ':names'
                // at the same branch point do not.
                if path.len() >= node.path.len()
                    && *node.path == path[..node.path.len()]
                    // Adding a child to a catch-all is not possible.
                    && node.node_type != NodeType::CatchAll
                    && (node.path.len() >= path.len() || path[node.path.len()] == b'/')
                {
                    wildcards -= 1;
                    continue 'walk;
                }

                return Err(wildcard_conflict(full_path, path, node));
            }

            let next = path[0];

            // Slash after a param.
            if node.node_type == NodeType::Param && next == b'/' && node.children.len() == 1 {
                node = &mut node.children[0];
                node.priority += 1;
                continue 'walk;
            }

            // Check if a child with the next path byte exists.
            for i in 0..node.indices.len() {
                if next == node.indices[i] {
                    let i = node.update_child_priority(i);
                    node = &mut node.children[i];
                    continue 'walk;
                }
            }

            // Otherwise insert it.
            if next != b':' && next != b'*' {
                node.indices.push(next);
                node.children.push(Node {
                    max_params: wildcards,
                    ..Node::default()
                });

                let i = node.update_child_priority(node.indices.len() - 1);
                node = &mut node.children[i];
            }

            return node.insert_child(wildcards, path, full_path, value);
        }
    }

    // Insert a route suffix at this node, creating param and catch-all
    // child nodes for any wildcard segments.
    fn insert_child(
        &mut self,
        mut wildcards: u8,
        path: &[u8],
        full_path: &str,
        value: T,
    ) -> Result<(), InsertError> {
        let mut node = self;
        let max = path.len();

        // Already handled bytes of the path.
        let mut offset = 0;
        let mut i = 0;

        // Scan for the prefix up to the next wildcard.
        while wildcards > 0 && i < max {
            let sigil = path[i];
            if sigil != b':' && sigil != b'*' {
                i += 1;
                continue;
            }

            // Find the wildcard end, either '/' or the path end.
            let mut end = i + 1;
            while end < max && path[end] != b'/' {
                match path[end] {
                    // The wildcard name must not contain ':' or '*'.
                    b':' | b'*' => {
                        return Err(InsertError::TooManyParams {
                            segment: lossy(&path[i..]),
                            path: full_path.to_owned(),
                        })
                    }
                    _ => end += 1,
                }
            }

            // Inserting the wildcard here would make the existing children
            // unreachable.
            if !node.children.is_empty() {
                return Err(InsertError::UnreachableWildcard {
                    segment: lossy(&path[i..end]),
                    path: full_path.to_owned(),
                });
            }

            // The wildcard must have a name.
            if end - i < 2 {
                return Err(InsertError::UnnamedWildcard {
                    path: full_path.to_owned(),
                });
            }

            if sigil == b':' {
                // Split the path at the beginning of the wildcard.
                if i > 0 {
                    node.path = path[offset..i].to_vec();
                    offset = i;
                }

                node.children = vec![Node {
                    node_type: NodeType::Param,
                    max_params: wildcards,
                    ..Node::default()
                }];
                node.wild_child = true;
                node = &mut node.children[0];
                node.priority += 1;
                wildcards -= 1;

                // If the path does not end with the wildcard there is
                // another static subpath starting with '/'.
                if end < max {
                    node.path = path[offset..end].to_vec();
                    offset = end;

                    node.children = vec![Node {
                        max_params: wildcards,
                        priority: 1,
                        ..Node::default()
                    }];
                    node = &mut node.children[0];
                }

                i += 1;
            } else {
                // Catch-all segments are terminal.
                if end != max || wildcards > 1 {
                    return Err(InsertError::InvalidCatchAll {
                        path: full_path.to_owned(),
                    });
                }

                if node.path.last() == Some(&b'/') {
                    return Err(InsertError::CatchAllRootConflict {
                        path: full_path.to_owned(),
                    });
                }

                // Currently fixed width 1 for the '/'.
                if i == 0 || path[i - 1] != b'/' {
                    return Err(InsertError::InvalidCatchAll {
                        path: full_path.to_owned(),
                    });
                }
                let slash = i - 1;

                node.path = path[offset..slash].to_vec();

                // First node: catch-all branch node with an empty path.
                node.children = vec![Node {
                    wild_child: true,
                    node_type: NodeType::CatchAll,
                    max_params: 1,
                    ..Node::default()
                }];
                if node.max_params < 1 {
                    node.max_params = 1;
                }
                node.indices = vec![path[slash]];
                node = &mut node.children[0];
                node.priority += 1;

                // Second node: node holding the variable and the value.
                node.children = vec![Node {
                    path: path[slash..].to_vec(),
                    node_type: NodeType::CatchAll,
                    max_params: 1,
                    priority: 1,
                    value: Some(value),
                    full_path: Box::from(full_path),
                    ..Node::default()
                }];

                return Ok(());
            }
        }

        // Insert the remaining path and the value into the leaf.
        node.path = path[offset..].to_vec();
        node.value = Some(value);
        node.full_path = Box::from(full_path);

        Ok(())
    }

    // Increments the priority of the given child, bubbling it leftward past
    // lower-priority siblings. Returns the new index of the child.
    fn update_child_priority(&mut self, i: usize) -> usize {
        self.children[i].priority += 1;
        let priority = self.children[i].priority;

        // Move the node to the front as necessary.
        let mut updated = i;
        while updated > 0 && self.children[updated - 1].priority < priority {
            self.children.swap(updated - 1, updated);
            updated -= 1;
        }

        // Update the position of the indices to match.
        if updated != i {
            self.indices[updated..=i].rotate_right(1);
        }

        updated
    }

    // Returns the value registered at the given path along with the matched
    // route's registration path and the captured parameters.
    //
    // The walk is iterative and read-only; concurrent lookups are safe once
    // registration has finished.
    pub(crate) fn at<'n, 'p>(
        &'n self,
        full_path: &'p [u8],
    ) -> Result<(&'n T, &'n str, Params<'p>), MatchError> {
        let mut node = self;
        let mut path = full_path;
        let mut params = Params::new();

        'walk: loop {
            if path.len() > node.path.len() {
                if path[..node.path.len()] == *node.path {
                    path = &path[node.path.len()..];

                    // If this node has no wildcard child we can just look
                    // up the next child node and continue walking down.
                    if !node.wild_child {
                        let next = path[0];
                        for (i, &index) in node.indices.iter().enumerate() {
                            if next == index {
                                node = &node.children[i];
                                continue 'walk;
                            }
                        }

                        // Nothing found. Recommend redirecting to the same
                        // URL without the trailing slash if a leaf exists.
                        if path == b"/" && node.value.is_some() {
                            return Err(MatchError::unsure(full_path));
                        }

                        return Err(MatchError::NotFound);
                    }

                    // Handle the wildcard child.
                    node = &node.children[0];
                    match node.node_type {
                        NodeType::Param => {
                            // Find the param end, either '/' or the path end.
                            let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());

                            // Save the param value.
                            params.reserve(usize::from(node.max_params));
                            params.push(node_str(&node.path[1..]), &path[..end]);

                            // We need to go deeper.
                            if end < path.len() {
                                if let [child] = node.children.as_slice() {
                                    path = &path[end..];
                                    node = child;
                                    continue 'walk;
                                }

                                // ... but we can't.
                                if path.len() == end + 1 {
                                    return Err(MatchError::unsure(full_path));
                                }

                                return Err(MatchError::NotFound);
                            }

                            if let Some(ref value) = node.value {
                                return Ok((value, &node.full_path, params));
                            }

                            // No value found. Check if one exists for this
                            // path plus a trailing slash.
                            if let [child] = node.children.as_slice() {
                                if *child.path == *b"/" && child.value.is_some() {
                                    return Err(MatchError::unsure(full_path));
                                }
                            }

                            return Err(MatchError::NotFound);
                        }
                        NodeType::CatchAll => {
                            // Save the param value, excluding the slash that
                            // separates it from the static prefix.
                            params.reserve(usize::from(node.max_params));
                            let captured = match path.first() {
                                Some(&b'/') => &path[1..],
                                _ => path,
                            };
                            params.push(node_str(&node.path[2..]), captured);

                            return match node.value {
                                Some(ref value) => Ok((value, &node.full_path, params)),
                                None => Err(MatchError::NotFound),
                            };
                        }
                        _ => unreachable!("wildcard child is always a param or catch-all node"),
                    }
                }
            } else if path == &*node.path {
                // We should have reached the node containing the value.
                if let Some(ref value) = node.value {
                    return Ok((value, &node.full_path, params));
                }

                if path == b"/" && node.wild_child && node.node_type != NodeType::Root {
                    return Err(MatchError::unsure(full_path));
                }

                // No value found. Check if one exists for this path plus a
                // trailing slash.
                for (i, &index) in node.indices.iter().enumerate() {
                    if index == b'/' {
                        let child = &node.children[i];
                        if (child.path.len() == 1 && child.value.is_some())
                            || (child.node_type == NodeType::CatchAll
                                && child.children[0].value.is_some())
                        {
                            return Err(MatchError::unsure(full_path));
                        }

                        return Err(MatchError::NotFound);
                    }
                }

                return Err(MatchError::NotFound);
            }

            // Nothing found. Recommend redirecting to the same URL with an
            // extra trailing slash if a leaf exists for that path.
            if path == b"/"
                || (node.path.len() == path.len() + 1
                    && node.path[path.len()] == b'/'
                    && *path == node.path[..path.len()]
                    && node.value.is_some())
            {
                return Err(MatchError::unsure(full_path));
            }

            return Err(MatchError::NotFound);
        }
    }

    // Case-insensitive lookup, used to suggest a corrected path after a
    // case-sensitive lookup failed. Returns the registered path with the
    // original case of any wildcard spans preserved.
    pub(crate) fn fix_path(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut out = Vec::with_capacity(path.len() + 1);
        self.fix_path_rec(path.as_bytes(), &mut out, [0; 4], fix_trailing_slash)
            // the output is stitched from registered route bytes and whole
            // character spans of the request path.
            .then(|| String::from_utf8(out).unwrap())
    }

    // The recursion carries up to 4 bytes of a multi-byte character split
    // across a node boundary in `rune`, so a case fold never applies to a
    // partial character. Both case forms of the next byte may exist as
    // sibling indices, which is what forces the recursive backtracking.
    fn fix_path_rec(
        &self,
        path: &[u8],
        out: &mut Vec<u8>,
        mut rune: [u8; 4],
        fix_trailing_slash: bool,
    ) -> bool {
        let len = self.path.len();

        if path.len() >= len && (len == 0 || path[1..len].eq_ignore_ascii_case(&self.path[1..])) {
            let old_path = path;
            let path = &path[len..];
            out.extend_from_slice(&self.path);

            if !path.is_empty() {
                // If this node has no wildcard child we can just look up the
                // next child node and continue walking down.
                if !self.wild_child {
                    // Skip bytes of the in-progress character that this
                    // node's segment already consumed.
                    rune = shift_rune_bytes(rune, len);

                    if rune[0] != 0 {
                        // The previous character is not finished yet.
                        for (i, &index) in self.indices.iter().enumerate() {
                            if index == rune[0] {
                                return self.children[i]
                                    .fix_path_rec(path, out, rune, fix_trailing_slash);
                            }
                        }
                    } else {
                        // Process a new character, which may have started up
                        // to three bytes before the end of this segment.
                        let mut ch = char::REPLACEMENT_CHARACTER;
                        let mut off = 0;
                        for j in 0..min(len, 3) {
                            let i = len - j;
                            if rune_start(old_path[i]) {
                                if let Some(decoded) = decode_char(&old_path[i..]) {
                                    ch = decoded;
                                }
                                off = j;
                                break;
                            }
                        }

                        let lo = ch.to_lowercase().next().unwrap_or(ch);
                        lo.encode_utf8(&mut rune);

                        // Skip the already processed bytes of the character.
                        rune = shift_rune_bytes(rune, off);

                        for (i, &index) in self.indices.iter().enumerate() {
                            // Lowercase matches. Both case forms might exist
                            // as an index, so recurse and backtrack instead
                            // of committing to this child.
                            if index == rune[0] {
                                let saved = out.len();
                                if self.children[i]
                                    .fix_path_rec(path, out, rune, fix_trailing_slash)
                                {
                                    return true;
                                }
                                out.truncate(saved);
                                break;
                            }
                        }

                        // Retry with the uppercase form if it differs.
                        let up = ch.to_uppercase().next().unwrap_or(ch);
                        if up != lo {
                            up.encode_utf8(&mut rune);
                            rune = shift_rune_bytes(rune, off);

                            for (i, &index) in self.indices.iter().enumerate() {
                                if index == rune[0] {
                                    return self.children[i]
                                        .fix_path_rec(path, out, rune, fix_trailing_slash);
                                }
                            }
                        }
                    }

                    // Nothing found. Recommend redirecting to the same URL
                    // without the trailing slash if a leaf exists.
                    return fix_trailing_slash && path == b"/" && self.value.is_some();
                }

                let child = &self.children[0];
                match child.node_type {
                    NodeType::Param => {
                        // Find the param end, either '/' or the path end.
                        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());

                        // Add the param value with its original case.
                        out.extend_from_slice(&path[..end]);

                        // We need to go deeper.
                        if end < path.len() {
                            if let [grandchild] = child.children.as_slice() {
                                return grandchild.fix_path_rec(
                                    &path[end..],
                                    out,
                                    rune,
                                    fix_trailing_slash,
                                );
                            }

                            // ... but we can't.
                            return fix_trailing_slash && path.len() == end + 1;
                        }

                        if child.value.is_some() {
                            return true;
                        }

                        if fix_trailing_slash {
                            // Check if a value for this path plus a trailing
                            // slash exists.
                            if let [grandchild] = child.children.as_slice() {
                                if *grandchild.path == *b"/" && grandchild.value.is_some() {
                                    out.push(b'/');
                                    return true;
                                }
                            }
                        }

                        false
                    }
                    NodeType::CatchAll => {
                        out.extend_from_slice(path);
                        true
                    }
                    _ => unreachable!("wildcard child is always a param or catch-all node"),
                }
            } else {
                // We should have reached the node containing the value.
                if self.value.is_some() {
                    return true;
                }

                // No value found. Try fixing the path by adding a trailing
                // slash.
                if fix_trailing_slash {
                    for (i, &index) in self.indices.iter().enumerate() {
                        if index == b'/' {
                            let child = &self.children[i];
                            if (child.path.len() == 1 && child.value.is_some())
                                || (child.node_type == NodeType::CatchAll
                                    && child.children[0].value.is_some())
                            {
                                out.push(b'/');
                                return true;
                            }

                            return false;
                        }
                    }
                }

                false
            }
        } else {
            // Nothing matched. Try fixing the path by adding or removing a
            // trailing slash.
            if fix_trailing_slash {
                if path == b"/" {
                    return true;
                }

                if path.len() + 1 == len
                    && self.path[path.len()] == b'/'
                    && path.eq_ignore_ascii_case(&self.path[..path.len()])
                    && self.value.is_some()
                {
                    out.extend_from_slice(&self.path);
                    return true;
                }
            }

            false
        }
    }

    // Calls the visitor with the registration path and value of every route
    // below this node.
    pub(crate) fn for_each<'n, F>(&'n self, visitor: &mut F)
    where
        F: FnMut(&'n str, &'n T),
    {
        if let Some(ref value) = self.value {
            visitor(&self.full_path, value);
        }

        for child in &self.children {
            child.for_each(visitor);
        }
    }

    /// Test helper that ensures route priorities are consistent.
    pub(crate) fn check_priorities(&self) -> Result<u32, (u32, u32)> {
        let mut priority: u32 = 0;
        for child in &self.children {
            priority += child.check_priorities()?;
        }

        if self.value.is_some() {
            priority += 1;
        }

        if self.priority != priority {
            return Err((self.priority, priority));
        }

        Ok(priority)
    }
}

// Diagnostic for a wildcard that does not agree with the wildcard already
// occupying this branch point, naming both wildcards and the shared prefix.
fn wildcard_conflict<T>(full_path: &str, path: &[u8], node: &Node<T>) -> InsertError {
    let segment = if node.node_type == NodeType::CatchAll {
        lossy(path)
    } else {
        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
        lossy(&path[..end])
    };

    let with = lossy(&node.path);
    let prefix = match full_path.find(&segment) {
        Some(i) => format!("{}{}", &full_path[..i], with),
        None => with.clone(),
    };

    InsertError::WildcardConflict {
        segment,
        path: full_path.to_owned(),
        with,
        prefix,
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// Wildcard names are whole path segments of a registration path, so they are
// always valid UTF-8.
fn node_str(bytes: &[u8]) -> &str {
    std::str::from_utf8(bytes).unwrap()
}

// Shift the rune buffer left by n bytes.
fn shift_rune_bytes(bytes: [u8; 4], n: usize) -> [u8; 4] {
    match n {
        0 => bytes,
        1 => [bytes[1], bytes[2], bytes[3], 0],
        2 => [bytes[2], bytes[3], 0, 0],
        3 => [bytes[3], 0, 0, 0],
        _ => [0; 4],
    }
}

// Whether the byte could be the first byte of an encoded character.
// Continuation bytes always have the top two bits set to 10.
fn rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

fn decode_char(bytes: &[u8]) -> Option<char> {
    std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next())
}

impl<T> fmt::Debug for Node<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &String::from_utf8_lossy(&self.path))
            .field("node_type", &self.node_type)
            .field("priority", &self.priority)
            .field("value", &self.value)
            .field("children", &self.children)
            .finish()
    }
}
